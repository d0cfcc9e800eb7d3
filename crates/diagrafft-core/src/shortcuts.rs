//! Keyboard shortcut registry.

use crate::input::{Key, KeyEvent};
use crate::tools::{Action, ToolKind};

/// A keyboard shortcut bound to a tool.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: Key,
    /// Ctrl, or Cmd on macOS.
    pub ctrl: bool,
    pub shift: bool,
    pub tool: ToolKind,
    pub description: &'static str,
}

impl Shortcut {
    pub fn new(key: Key, ctrl: bool, shift: bool, tool: ToolKind, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            tool,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+G").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        parts.push(match &self.key {
            Key::Char(c) => c.to_ascii_uppercase().to_string(),
            Key::Other(name) => name.clone(),
            other => format!("{:?}", other),
        });
        parts.join("+")
    }

    fn matches(&self, event: &KeyEvent) -> bool {
        self.ctrl == event.modifiers.command()
            && self.shift == event.modifiers.shift
            && normalize(&self.key) == normalize(&event.key)
    }
}

fn normalize(key: &Key) -> Key {
    match key {
        Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
        other => other.clone(),
    }
}

/// Maps key chords to the tools they activate.
#[derive(Debug, Clone)]
pub struct ShortcutRegistry {
    shortcuts: Vec<Shortcut>,
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        let action = ToolKind::Action;
        Self {
            shortcuts: vec![
                Shortcut::new(Key::Char('a'), true, false, action(Action::SelectAll), "Select all"),
                Shortcut::new(Key::Char('z'), true, false, action(Action::Undo), "Undo"),
                Shortcut::new(Key::Char('z'), true, true, action(Action::Redo), "Redo"),
                Shortcut::new(Key::Char('y'), true, false, action(Action::Redo), "Redo"),
                Shortcut::new(Key::Char('g'), true, false, action(Action::Group), "Group selected items"),
                Shortcut::new(Key::Char('g'), true, true, action(Action::Ungroup), "Ungroup selected groups"),
                Shortcut::new(Key::Char('c'), true, false, action(Action::Copy), "Copy"),
                Shortcut::new(Key::Char('x'), true, false, action(Action::Cut), "Cut"),
                Shortcut::new(Key::Char('v'), true, false, action(Action::Paste), "Paste"),
                Shortcut::new(Key::Char(']'), true, false, action(Action::SendForwards), "Bring forwards"),
                Shortcut::new(Key::Char(']'), true, true, action(Action::SendToFront), "Bring to front"),
                Shortcut::new(Key::Char('['), true, false, action(Action::SendBackwards), "Send backwards"),
                Shortcut::new(Key::Char('['), true, true, action(Action::SendToBack), "Send to back"),
                Shortcut::new(Key::Delete, false, false, action(Action::Delete), "Delete selection"),
                Shortcut::new(Key::Backspace, false, false, action(Action::Delete), "Delete selection"),
            ],
        }
    }
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// Add a binding. Earlier bindings for the same chord win.
    pub fn register(&mut self, shortcut: Shortcut) {
        self.shortcuts.push(shortcut);
    }

    /// Tool bound to the chord in `event`, if any.
    pub fn lookup(&self, event: &KeyEvent) -> Option<ToolKind> {
        self.shortcuts
            .iter()
            .find(|shortcut| shortcut.matches(event))
            .map(|shortcut| shortcut.tool)
    }
}
