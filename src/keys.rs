// src/keys.rs

//! The logical key and mouse-button vocabulary. Backends translate their
//! native key codes into `Key` through a fixed table; the engine only ever
//! sees this set.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A logical keyboard key.
///
/// The enum doubles as a dense index into the keyboard latch (`key as usize`),
/// so the variant order is part of the layout: `Backquote` must stay last for
/// `Key::COUNT` to cover the whole set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    Up,
    Down,
    Left,
    Right,

    Space,
    Tab,
    Enter,
    Escape,
    Backspace,

    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    LeftAlt,
    RightAlt,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    Pause,
    ScrollLock,

    // Common punctuation
    Comma,
    Period,
    Minus,
    Equals,
    Semicolon,
    Slash,
    Backslash,
    Apostrophe,
    LeftBracket,
    RightBracket,
    Backquote,
}

impl Key {
    /// Number of logical keys; the size of the keyboard latch.
    pub const COUNT: usize = Key::Backquote as usize + 1;

    /// Returns true for shift, control, and alt keys.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Key::LeftShift
                | Key::RightShift
                | Key::LeftControl
                | Key::RightControl
                | Key::LeftAlt
                | Key::RightAlt
        )
    }
}

/// Number of mouse buttons tracked by the engine.
pub const MOUSE_BUTTON_COUNT: usize = 5;

bitflags! {
    /// Packed raw mouse-button snapshot, one bit per button index.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MouseButtons: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const MIDDLE = 1 << 2;
        const X1 = 1 << 3;
        const X2 = 1 << 4;
    }
}

impl MouseButtons {
    /// The flag for a button index, or empty for indices past the tracked set.
    pub fn from_index(index: usize) -> Self {
        if index < MOUSE_BUTTON_COUNT {
            MouseButtons::from_bits_truncate(1 << index)
        } else {
            MouseButtons::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_covers_every_variant() {
        assert_eq!(Key::A as usize, 0);
        assert!(Key::COUNT > Key::RightBracket as usize);
        assert_eq!(Key::Backquote as usize, Key::COUNT - 1);
    }

    #[test]
    fn modifier_classification() {
        assert!(Key::LeftShift.is_modifier());
        assert!(Key::RightAlt.is_modifier());
        assert!(!Key::A.is_modifier());
        assert!(!Key::Enter.is_modifier());
    }

    #[test]
    fn button_index_maps_to_flags() {
        assert_eq!(MouseButtons::from_index(0), MouseButtons::LEFT);
        assert_eq!(MouseButtons::from_index(2), MouseButtons::MIDDLE);
        assert_eq!(MouseButtons::from_index(4), MouseButtons::X2);
        assert_eq!(MouseButtons::from_index(5), MouseButtons::empty());
    }
}
