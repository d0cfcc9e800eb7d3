//! The editor facade: context, tools and shortcuts behind one entry point.

use crate::config::EditorConfig;
use crate::context::EditorContext;
use crate::document::Document;
use crate::entity::EntityId;
use crate::error::{EditorError, EditorResult};
use crate::input::{EventResult, KeyEvent, KeyPhase, PointerEvent};
use crate::selection::Selection;
use crate::shortcuts::ShortcutRegistry;
use crate::tools::{Action, ToolKind, ToolManager};

/// Drives tools from input events and owns all editor state.
#[derive(Debug)]
pub struct Editor {
    ctx: EditorContext,
    tools: ToolManager,
    shortcuts: ShortcutRegistry,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_context(EditorContext::new(config))
    }

    /// Build around a prepared context, e.g. one with a custom view or clipboard.
    pub fn with_context(ctx: EditorContext) -> Self {
        Self {
            ctx,
            tools: ToolManager::new(),
            shortcuts: ShortcutRegistry::new(),
        }
    }

    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut EditorContext {
        &mut self.ctx
    }

    pub fn document(&self) -> &Document {
        &self.ctx.document
    }

    pub fn selection(&self) -> &Selection {
        &self.ctx.selection
    }

    /// Replace the selection. Every id must name an entity in the document.
    pub fn select(&mut self, ids: &[EntityId]) -> EditorResult<()> {
        if let Some(&unknown) = ids.iter().find(|&&id| !self.ctx.document.contains(id)) {
            return Err(EditorError::UnknownEntity(unknown));
        }
        self.ctx.selection.select_all(ids.iter().copied());
        self.ctx.view.invalidate(None);
        Ok(())
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolManager {
        &mut self.tools
    }

    pub fn shortcuts_mut(&mut self) -> &mut ShortcutRegistry {
        &mut self.shortcuts
    }

    /// Activate a tool by name, e.g. `"rectangle"` or `"align-left"`.
    pub fn activate_tool(&mut self, name: &str) -> EditorResult<()> {
        let kind = ToolKind::from_name(name).ok_or_else(|| EditorError::UnknownTool(name.to_string()))?;
        self.activate(kind)
    }

    pub fn activate(&mut self, kind: ToolKind) -> EditorResult<()> {
        self.tools.activate_tool(&mut self.ctx, kind)
    }

    pub fn deactivate_tool(&mut self, kind: ToolKind) {
        self.tools.deactivate_tool(&mut self.ctx, kind);
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent) -> EditorResult<EventResult> {
        event.input().validate()?;
        let result = self.tools.handle_pointer(&mut self.ctx, event);
        self.report(result)
    }

    /// Tools see the key first; an unhandled key-down may trigger a shortcut.
    pub fn handle_key(&mut self, event: &KeyEvent) -> EditorResult<EventResult> {
        let result = self.tools.handle_key(&mut self.ctx, event);
        if self.report(result)?.is_handled() {
            return Ok(EventResult::Handled);
        }
        if event.phase != KeyPhase::Down {
            return Ok(EventResult::Ignored);
        }
        match self.shortcuts.lookup(event) {
            Some(kind) => {
                log::debug!("Shortcut for {}", kind);
                self.activate(kind)?;
                Ok(EventResult::Handled)
            }
            None => Ok(EventResult::Ignored),
        }
    }

    pub fn undo(&mut self) -> EditorResult<()> {
        self.activate(ToolKind::Action(Action::Undo))
    }

    pub fn redo(&mut self) -> EditorResult<()> {
        self.activate(ToolKind::Action(Action::Redo))
    }

    /// Turn validation failures raised mid-gesture into user messages.
    fn report(&mut self, result: EditorResult<EventResult>) -> EditorResult<EventResult> {
        match result {
            Err(EditorError::Validation(err)) => {
                self.ctx.report(&err);
                Ok(EventResult::Handled)
            }
            other => other,
        }
    }
}
