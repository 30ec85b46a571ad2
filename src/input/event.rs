//! Input event types.

use crate::input::keyboard::KeyEvent;
use std::borrow::Cow;

/// A decoded input event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Keyboard event.
    Key(KeyEvent),
    /// Bracketed paste payload.
    Paste(PasteEvent),
    /// Input that matched no known key sequence, decoded as UTF-8 on a
    /// best-effort basis.
    Text(String),
}

impl Event {
    /// Check if this is a key event.
    #[must_use]
    pub fn is_key(&self) -> bool {
        matches!(self, Self::Key(_))
    }

    /// Get the key event if this is one.
    #[must_use]
    pub fn key(&self) -> Option<&KeyEvent> {
        match self {
            Self::Key(e) => Some(e),
            _ => None,
        }
    }

    /// Get the paste event if this is one.
    #[must_use]
    pub fn paste(&self) -> Option<&PasteEvent> {
        match self {
            Self::Paste(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this is a paste event.
    #[must_use]
    pub fn is_paste(&self) -> bool {
        matches!(self, Self::Paste(_))
    }

    /// Short human-readable label, see [`KeyEvent::label`]. Paste and text
    /// events render as their content.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Key(key) => key.label(),
            Self::Paste(paste) => paste.text().into_owned(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl From<KeyEvent> for Event {
    fn from(e: KeyEvent) -> Self {
        Self::Key(e)
    }
}

impl From<PasteEvent> for Event {
    fn from(e: PasteEvent) -> Self {
        Self::Paste(e)
    }
}

/// Paste event (bracketed paste mode).
///
/// The payload is kept byte for byte as the terminal sent it: no key
/// decoding and no newline normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasteEvent {
    content: Vec<u8>,
}

impl PasteEvent {
    /// Create a new paste event.
    #[must_use]
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Raw pasted bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.content
    }

    /// Pasted content as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Take ownership of the raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.content
    }
}
