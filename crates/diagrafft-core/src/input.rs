//! Pointer and keyboard events routed to tools.

use crate::error::{EditorError, EditorResult};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Payload shared by all pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    /// Pointer location in world coordinates.
    pub position: Point,
    #[serde(default)]
    pub button: MouseButton,
    /// 1 for a single click, 2 for a double click, ...
    #[serde(default = "default_click_count")]
    pub click_count: u32,
    #[serde(default)]
    pub modifiers: Modifiers,
}

fn default_click_count() -> u32 {
    1
}

impl PointerInput {
    /// A plain left-button input at `position`.
    pub fn at(position: Point) -> Self {
        Self {
            position,
            button: MouseButton::Left,
            click_count: 1,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_click_count(mut self, click_count: u32) -> Self {
        self.click_count = click_count;
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// Reject inputs a caller should never produce.
    pub fn validate(&self) -> EditorResult<()> {
        if !self.position.is_finite() {
            return Err(EditorError::InvalidArgument(format!(
                "pointer position must be finite, got {:?}",
                self.position
            )));
        }
        if self.click_count == 0 {
            return Err(EditorError::InvalidArgument(
                "click count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Down(PointerInput),
    Move(PointerInput),
    Up(PointerInput),
}

impl PointerEvent {
    pub fn input(&self) -> &PointerInput {
        match self {
            PointerEvent::Down(input) | PointerEvent::Move(input) | PointerEvent::Up(input) => {
                input
            }
        }
    }

    pub fn position(&self) -> Point {
        self.input().position
    }
}

/// Keys the framework cares about. Everything else arrives as `Char` or `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Enter,
    Delete,
    Backspace,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Char(char),
    Other(String),
}

impl Key {
    /// Parse a key name such as `"Escape"`, `"ArrowUp"` or `"g"`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "Enter" | "Return" => Key::Enter,
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other(name.to_string()),
                }
            }
        }
    }
}

/// Phase of a keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPhase {
    Down,
    Up,
    Press,
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub phase: KeyPhase,
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn down(key: Key) -> Self {
        Self {
            phase: KeyPhase::Down,
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn up(key: Key) -> Self {
        Self {
            phase: KeyPhase::Up,
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn press(key: Key) -> Self {
        Self {
            phase: KeyPhase::Press,
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Whether a handler consumed an event. `Handled` stops further propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventResult {
    Handled,
    #[default]
    Ignored,
}

impl EventResult {
    pub fn is_handled(self) -> bool {
        self == EventResult::Handled
    }
}

impl From<bool> for EventResult {
    fn from(handled: bool) -> Self {
        if handled {
            EventResult::Handled
        } else {
            EventResult::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_finite_position() {
        let input = PointerInput::at(Point::new(f64::NAN, 0.0));
        assert!(matches!(input.validate(), Err(EditorError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_zero_clicks() {
        let input = PointerInput::at(Point::ZERO).with_click_count(0);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("Escape"), Key::Escape);
        assert_eq!(Key::from_name("ArrowUp"), Key::ArrowUp);
        assert_eq!(Key::from_name("g"), Key::Char('g'));
        assert_eq!(Key::from_name("F5"), Key::Other("F5".to_string()));
    }

    #[test]
    fn test_pointer_event_json() {
        let json = r#"{ "kind": "down", "position": { "x": 5.0, "y": 6.0 } }"#;
        let event: PointerEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.position(), Point::new(5.0, 6.0));
        assert_eq!(event.input().click_count, 1);
        assert_eq!(event.input().button, MouseButton::Left);
    }
}
