//! Keyboard event types.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        /// Shift key.
        const SHIFT = 0b0000_0001;
        /// Alt/Option key.
        const ALT = 0b0000_0010;
        /// Control key.
        const CTRL = 0b0000_0100;
    }
}

/// Control code of the Escape key.
pub const ESC: u8 = 0x1b;

/// A decoded key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable rune.
    Char(char),
    /// A C0 control byte or DEL (after normalization), e.g. 13 for Return
    /// or 27 for a standalone Escape.
    Control(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    /// Function key (F1-F12).
    F(u8),
    /// Bracketed paste start marker.
    PasteStart,
    /// Bracketed paste end marker.
    PasteEnd,
}

impl KeyCode {
    /// Check if this is a function key.
    #[must_use]
    pub fn is_function_key(&self) -> bool {
        matches!(self, Self::F(_))
    }

    /// Check if this is a navigation key (arrows, home, end, page up/down).
    #[must_use]
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::Left
                | Self::Right
                | Self::Up
                | Self::Down
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }

    /// Get the character if this is a character key.
    #[must_use]
    pub fn char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }

    fn glyph(&self) -> Option<&'static str> {
        Some(match self {
            Self::Up => "↑",
            Self::Down => "↓",
            Self::Right => "→",
            Self::Left => "←",
            Self::Home => "⇱",
            Self::End => "⇲",
            Self::Insert => "⎀",
            Self::Delete => "⌦",
            Self::PageUp => "⇞",
            Self::PageDown => "⇟",
            Self::PasteStart => "[PASTE_START]",
            Self::PasteEnd => "[PASTE_END]",
            Self::Char(_) | Self::Control(_) | Self::F(_) => return None,
        })
    }
}

/// A keyboard event together with the number of input bytes it consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key code.
    pub code: KeyCode,
    /// Modifier keys held.
    pub modifiers: KeyModifiers,
    /// Input bytes this event was decoded from.
    pub consumed: usize,
}

impl KeyEvent {
    /// Create a new key event.
    #[must_use]
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self {
            code,
            modifiers,
            consumed: 0,
        }
    }

    /// Create a key event with no modifiers.
    #[must_use]
    pub fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    /// Create a character key event.
    #[must_use]
    pub fn char(c: char) -> Self {
        Self::key(KeyCode::Char(c))
    }

    /// Create a control-code key event.
    #[must_use]
    pub fn control(byte: u8) -> Self {
        Self::key(KeyCode::Control(byte))
    }

    #[must_use]
    pub fn with_consumed(mut self, consumed: usize) -> Self {
        self.consumed = consumed;
        self
    }

    /// Check if Shift is held.
    #[must_use]
    pub fn shift(&self) -> bool {
        self.modifiers.contains(KeyModifiers::SHIFT)
    }

    /// Check if Ctrl is held.
    #[must_use]
    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(KeyModifiers::CTRL)
    }

    /// Check if Alt is held.
    #[must_use]
    pub fn alt(&self) -> bool {
        self.modifiers.contains(KeyModifiers::ALT)
    }

    /// Check if this matches a specific key with modifiers, ignoring the
    /// consumed byte count.
    #[must_use]
    pub fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        self.code == code && self.modifiers == modifiers
    }

    /// Check if this is Ctrl+C.
    #[must_use]
    pub fn is_ctrl_c(&self) -> bool {
        self.code == KeyCode::Control(3)
    }

    /// Check if this is a standalone Escape.
    #[must_use]
    pub fn is_esc(&self) -> bool {
        self.code == KeyCode::Control(ESC)
    }

    /// Check if this is Return (CR, or LF after normalization).
    #[must_use]
    pub fn is_enter(&self) -> bool {
        matches!(self.code, KeyCode::Control(b'\r' | b'\n'))
    }

    /// Short human-readable label: the rune itself, a glyph for named keys
    /// (`↑`, `C-↑`, `F5`, `⎘`), or `c:<code>` for control bytes.
    #[must_use]
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code == KeyCode::Insert && self.modifiers == KeyModifiers::CTRL {
            return f.write_str("⎘");
        }
        if self.ctrl() {
            f.write_str("C-")?;
        }
        if self.alt() {
            f.write_str("M-")?;
        }
        if self.shift() {
            f.write_str("S-")?;
        }
        match self.code {
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Control(b) => write!(f, "c:{b}"),
            KeyCode::F(n) => write!(f, "F{n}"),
            code => f.write_str(code.glyph().unwrap_or_default()),
        }
    }
}

impl From<char> for KeyEvent {
    fn from(c: char) -> Self {
        Self::char(c)
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::key(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_event_creation() {
        let event = KeyEvent::char('a');
        assert_eq!(event.code, KeyCode::Char('a'));
        assert!(event.modifiers.is_empty());
        assert_eq!(event.with_consumed(1).consumed, 1);
    }

    #[test]
    fn test_key_event_modifiers() {
        let event = KeyEvent::new(KeyCode::Up, KeyModifiers::CTRL);
        assert!(event.ctrl());
        assert!(!event.shift());
        assert!(!event.alt());
        assert!(event.matches(KeyCode::Up, KeyModifiers::CTRL));
    }

    #[test]
    fn test_control_helpers() {
        assert!(KeyEvent::control(3).is_ctrl_c());
        assert!(KeyEvent::control(27).is_esc());
        assert!(KeyEvent::control(13).is_enter());
        assert!(KeyEvent::control(10).is_enter());
        assert!(!KeyEvent::char('q').is_enter());
    }

    #[test]
    fn test_key_code_checks() {
        assert!(KeyCode::F(1).is_function_key());
        assert!(KeyCode::Up.is_navigation());
        assert!(!KeyCode::Control(13).is_navigation());
        assert_eq!(KeyCode::Char('x').char(), Some('x'));
    }

    #[test]
    fn test_labels() {
        assert_eq!(KeyEvent::char('a').label(), "a");
        assert_eq!(KeyEvent::control(27).label(), "c:27");
        assert_eq!(KeyEvent::key(KeyCode::Up).label(), "↑");
        assert_eq!(KeyEvent::new(KeyCode::Up, KeyModifiers::CTRL).label(), "C-↑");
        assert_eq!(KeyEvent::new(KeyCode::Left, KeyModifiers::ALT).label(), "M-←");
        assert_eq!(KeyEvent::new(KeyCode::Insert, KeyModifiers::SHIFT).label(), "S-⎀");
        assert_eq!(KeyEvent::new(KeyCode::Insert, KeyModifiers::CTRL).label(), "⎘");
        assert_eq!(KeyEvent::key(KeyCode::F(12)).label(), "F12");
        assert_eq!(KeyEvent::key(KeyCode::PageDown).label(), "⇟");
        assert_eq!(KeyEvent::key(KeyCode::PasteStart).label(), "[PASTE_START]");
    }
}
