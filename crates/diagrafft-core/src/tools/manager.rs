//! Routes input to tools and keeps their activation and suspension state.

use super::{Tool, ToolCategory, ToolKind, ToolRequest};
use crate::context::EditorContext;
use crate::error::{EditorError, EditorResult};
use crate::input::{EventResult, Key, KeyEvent, KeyPhase, PointerEvent};
use std::collections::HashSet;

struct Slot {
    tool: Box<dyn Tool>,
    suspended: bool,
}

impl Slot {
    fn new(tool: Box<dyn Tool>) -> Self {
        Self {
            tool,
            suspended: false,
        }
    }
}

/// Owns every tool instance.
///
/// Listener tools always receive input in priority order. At most one modal
/// tool is active at a time and sees input before the listeners. A tool that
/// starts a gesture suspends the others until it releases them.
pub struct ToolManager {
    listeners: Vec<Slot>,
    modal: Option<Slot>,
    active: Option<ToolKind>,
    disabled: HashSet<ToolKind>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolManager")
            .field("active", &self.active)
            .field("modal", &self.modal.as_ref().map(|slot| slot.tool.kind()))
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl ToolManager {
    pub fn new() -> Self {
        Self {
            listeners: ToolKind::LISTENERS
                .iter()
                .map(|kind| Slot::new(kind.create()))
                .collect(),
            modal: None,
            active: None,
            disabled: HashSet::new(),
        }
    }

    /// The tool most recently activated and still active.
    pub fn active_tool(&self) -> Option<ToolKind> {
        self.active
    }

    pub fn is_active(&self, kind: ToolKind) -> bool {
        self.active == Some(kind)
    }

    pub fn is_enabled(&self, kind: ToolKind) -> bool {
        !self.disabled.contains(&kind)
    }

    /// Disabled tools can't be activated and listeners stop receiving input.
    pub fn set_enabled(&mut self, kind: ToolKind, enabled: bool) {
        if enabled {
            self.disabled.remove(&kind);
        } else {
            self.disabled.insert(kind);
        }
    }

    pub fn is_suspended(&self, kind: ToolKind) -> bool {
        self.slots().any(|slot| slot.tool.kind() == kind && slot.suspended)
    }

    /// Whether any tool is in the middle of a gesture.
    pub fn is_busy(&self) -> bool {
        self.slots().any(|slot| slot.tool.is_busy())
    }

    fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.modal.iter().chain(self.listeners.iter())
    }

    fn slots_mut(&mut self) -> impl Iterator<Item = &mut Slot> {
        self.modal.iter_mut().chain(self.listeners.iter_mut())
    }

    /// Activate a tool. Any other active tool is deactivated first.
    ///
    /// Action tools run and deactivate immediately; a validation failure is
    /// reported to the user and is not an error for the caller.
    pub fn activate_tool(&mut self, ctx: &mut EditorContext, kind: ToolKind) -> EditorResult<()> {
        if !self.is_enabled(kind) {
            return Err(EditorError::InvalidArgument(format!("tool {} is disabled", kind)));
        }
        log::info!("Activating tool {}", kind);
        self.cancel_gestures(ctx);
        self.deactivate_modal(ctx);
        if let Some(previous) = self.active.take() {
            if let Some(slot) = self.listener_mut(previous) {
                slot.tool.on_deactivate(ctx);
            }
        }

        match kind.category() {
            ToolCategory::Action => {
                let mut tool = kind.create();
                let result = tool.on_activate(ctx);
                tool.on_deactivate(ctx);
                ctx.take_requests();
                match result {
                    Err(EditorError::Validation(err)) => {
                        ctx.report(&err);
                        Ok(())
                    }
                    other => other,
                }
            }
            ToolCategory::Modal => {
                let mut tool = kind.create();
                tool.on_activate(ctx)?;
                self.modal = Some(Slot::new(tool));
                self.active = Some(kind);
                self.apply_requests(ctx, kind);
                Ok(())
            }
            ToolCategory::Listener => {
                if let Some(slot) = self.listener_mut(kind) {
                    slot.tool.on_activate(ctx)?;
                }
                self.active = Some(kind);
                self.apply_requests(ctx, kind);
                Ok(())
            }
        }
    }

    /// Deactivate `kind` if it is active. Gestures in progress are cancelled.
    pub fn deactivate_tool(&mut self, ctx: &mut EditorContext, kind: ToolKind) {
        if self.modal.as_ref().is_some_and(|slot| slot.tool.kind() == kind) {
            self.deactivate_modal(ctx);
            return;
        }
        if self.active == Some(kind) {
            if let Some(slot) = self.listener_mut(kind) {
                if slot.tool.is_busy() {
                    slot.tool.cancel(ctx);
                }
                slot.tool.on_deactivate(ctx);
            }
            self.active = None;
            self.unsuspend_all();
            ctx.take_requests();
            log::info!("Deactivated tool {}", kind);
        }
    }

    fn listener_mut(&mut self, kind: ToolKind) -> Option<&mut Slot> {
        self.listeners.iter_mut().find(|slot| slot.tool.kind() == kind)
    }

    fn deactivate_modal(&mut self, ctx: &mut EditorContext) {
        let Some(mut slot) = self.modal.take() else {
            return;
        };
        let kind = slot.tool.kind();
        if slot.tool.is_busy() {
            slot.tool.cancel(ctx);
        }
        slot.tool.on_deactivate(ctx);
        ctx.take_requests();
        if self.active == Some(kind) {
            self.active = None;
        }
        self.unsuspend_all();
        log::info!("Deactivated tool {}", kind);
    }

    /// Cancel busy listeners, leaving the model as before their gesture.
    fn cancel_gestures(&mut self, ctx: &mut EditorContext) -> bool {
        let mut cancelled = false;
        for slot in &mut self.listeners {
            if slot.tool.is_busy() {
                log::debug!("Cancelling {} gesture", slot.tool.kind());
                slot.tool.cancel(ctx);
                cancelled = true;
            }
        }
        if cancelled {
            ctx.take_requests();
            self.unsuspend_all();
        }
        cancelled
    }

    fn unsuspend_all(&mut self) {
        for slot in self.slots_mut() {
            slot.suspended = false;
        }
    }

    fn apply_requests(&mut self, ctx: &mut EditorContext, from: ToolKind) {
        for request in ctx.take_requests() {
            match request {
                ToolRequest::SuspendOthers => {
                    log::debug!("{} suspended other tools", from);
                    for slot in self.slots_mut() {
                        slot.suspended = slot.tool.kind() != from;
                    }
                }
                ToolRequest::UnsuspendAll => self.unsuspend_all(),
                ToolRequest::Deactivate => {
                    if self.modal.as_ref().is_some_and(|slot| slot.tool.kind() == from) {
                        self.deactivate_modal(ctx);
                    }
                }
            }
        }
    }

    /// Route a pointer event: modal tool first, then listeners by priority.
    pub fn handle_pointer(&mut self, ctx: &mut EditorContext, event: &PointerEvent) -> EditorResult<EventResult> {
        if let Some(slot) = self.modal.as_mut().filter(|slot| !slot.suspended) {
            let kind = slot.tool.kind();
            let result = dispatch_pointer(slot.tool.as_mut(), ctx, event);
            self.apply_requests(ctx, kind);
            if result?.is_handled() {
                return Ok(EventResult::Handled);
            }
        }
        for index in 0..self.listeners.len() {
            let slot = &mut self.listeners[index];
            let kind = slot.tool.kind();
            if slot.suspended || self.disabled.contains(&kind) {
                continue;
            }
            let result = dispatch_pointer(slot.tool.as_mut(), ctx, event);
            self.apply_requests(ctx, kind);
            if result?.is_handled() {
                return Ok(EventResult::Handled);
            }
        }
        Ok(EventResult::Ignored)
    }

    /// Route a key event. Escape goes to the modal tool, otherwise cancels a
    /// gesture in progress, otherwise clears the selection.
    pub fn handle_key(&mut self, ctx: &mut EditorContext, event: &KeyEvent) -> EditorResult<EventResult> {
        if event.phase == KeyPhase::Down && event.key == Key::Escape {
            return self.escape(ctx, event);
        }
        if let Some(slot) = self.modal.as_mut().filter(|slot| !slot.suspended) {
            let kind = slot.tool.kind();
            let result = dispatch_key(slot.tool.as_mut(), ctx, event);
            self.apply_requests(ctx, kind);
            if result?.is_handled() {
                return Ok(EventResult::Handled);
            }
        }
        for index in 0..self.listeners.len() {
            let slot = &mut self.listeners[index];
            let kind = slot.tool.kind();
            if slot.suspended || self.disabled.contains(&kind) {
                continue;
            }
            let result = dispatch_key(slot.tool.as_mut(), ctx, event);
            self.apply_requests(ctx, kind);
            if result?.is_handled() {
                return Ok(EventResult::Handled);
            }
        }
        Ok(EventResult::Ignored)
    }

    fn escape(&mut self, ctx: &mut EditorContext, event: &KeyEvent) -> EditorResult<EventResult> {
        if let Some(slot) = self.modal.as_mut() {
            let kind = slot.tool.kind();
            let result = slot.tool.on_key_down(ctx, event);
            self.apply_requests(ctx, kind);
            // Escape always ends a modal tool.
            self.deactivate_modal(ctx);
            result?;
            return Ok(EventResult::Handled);
        }
        if self.cancel_gestures(ctx) {
            return Ok(EventResult::Handled);
        }
        if !ctx.selection.is_empty() {
            ctx.selection.clear();
            ctx.view.invalidate(None);
            return Ok(EventResult::Handled);
        }
        Ok(EventResult::Ignored)
    }
}

fn dispatch_pointer(tool: &mut dyn Tool, ctx: &mut EditorContext, event: &PointerEvent) -> EditorResult<EventResult> {
    match event {
        PointerEvent::Down(input) => tool.on_pointer_down(ctx, input),
        PointerEvent::Move(input) => tool.on_pointer_move(ctx, input),
        PointerEvent::Up(input) => tool.on_pointer_up(ctx, input),
    }
}

fn dispatch_key(tool: &mut dyn Tool, ctx: &mut EditorContext, event: &KeyEvent) -> EditorResult<EventResult> {
    match event.phase {
        KeyPhase::Down => tool.on_key_down(ctx, event),
        KeyPhase::Up => tool.on_key_up(ctx, event),
        KeyPhase::Press => tool.on_key_press(ctx, event),
    }
}
