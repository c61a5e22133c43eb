//! Input events delivered to the frame callback

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable character, lowercased.
    Char(char),
    Escape,
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
}

impl Key {
    /// Convert from a winit logical key.
    pub fn from_winit(key: &winit::keyboard::Key) -> Option<Self> {
        use winit::keyboard::{Key as WKey, NamedKey};

        match key {
            WKey::Character(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c.to_ascii_lowercase())),
                    _ => None,
                }
            }
            WKey::Named(named) => match named {
                NamedKey::Escape => Some(Key::Escape),
                NamedKey::Space => Some(Key::Space),
                NamedKey::Enter => Some(Key::Enter),
                NamedKey::Tab => Some(Key::Tab),
                NamedKey::ArrowLeft => Some(Key::Left),
                NamedKey::ArrowRight => Some(Key::Right),
                NamedKey::ArrowUp => Some(Key::Up),
                NamedKey::ArrowDown => Some(Key::Down),
                NamedKey::PageUp => Some(Key::PageUp),
                NamedKey::PageDown => Some(Key::PageDown),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Key pressed (repeats while held).
    KeyPress { key: Key, handled: bool },

    /// Key released.
    KeyRelease { key: Key, handled: bool },

    /// Window resized.
    Resize { width: u32, height: u32 },
}

impl Event {
    /// Unhandled key press.
    pub fn key_press(key: Key) -> Self {
        Event::KeyPress {
            key,
            handled: false,
        }
    }

    /// Check if the event has been handled.
    pub fn is_handled(&self) -> bool {
        match self {
            Event::KeyPress { handled, .. } | Event::KeyRelease { handled, .. } => *handled,
            Event::Resize { .. } => false,
        }
    }

    /// Mark the event as handled.
    pub fn set_handled(&mut self) {
        match self {
            Event::KeyPress { handled, .. } | Event::KeyRelease { handled, .. } => {
                *handled = true
            }
            Event::Resize { .. } => {}
        }
    }
}
