//! Incremental byte-to-event decoder.
//!
//! Bytes are fed as they arrive and events are pulled out one at a time.
//! A prefix that could still grow into a longer sequence (a lone ESC, a
//! CSI without its final byte, a partial UTF-8 rune) stays buffered until
//! more bytes arrive or the caller gives up waiting and calls
//! [`Decoder::flush`].
//!
//! Decoding never fails: input that matches no table entry is returned as
//! [`Event::Text`] and every call makes forward progress.

use crate::ansi::sequences::PASTE_END;
use crate::input::event::{Event, PasteEvent};
use crate::input::keyboard::{ESC, KeyCode, KeyEvent, KeyModifiers};
use crate::input::table;
use crate::terminal::Capabilities;

/// Maximum paste accumulated before a partial paste event is delivered (10 MB).
pub const MAX_PASTE_BUFFER_SIZE: usize = 10 * 1024 * 1024;

/// CSI sequences longer than this without a final byte are given up on.
const MAX_CSI_LEN: usize = 32;

/// Terminal-specific rewriting of single control bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Normalization {
    /// Report carriage return (13) as line feed (10).
    pub cr_to_lf: bool,
    /// Report DEL (127) as backspace (8).
    pub del_to_backspace: bool,
}

impl Normalization {
    /// PuTTY sends CR for Return and DEL for Backspace; multiplexers send
    /// DEL for Backspace.
    #[must_use]
    pub fn from_capabilities(caps: &Capabilities) -> Self {
        Self {
            cr_to_lf: caps.is_putty(),
            del_to_backspace: caps.is_putty() || caps.is_multiplexed(),
        }
    }

    fn apply(self, byte: u8) -> u8 {
        match byte {
            b'\r' if self.cr_to_lf => b'\n',
            0x7f if self.del_to_backspace => 0x08,
            other => other,
        }
    }
}

/// Outcome of decoding the front of the buffer.
#[derive(Debug)]
enum Step {
    Event(Event, usize),
    Incomplete,
}

/// Stateful decoder: pending bytes plus the bracketed-paste toggle.
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    pending: Vec<u8>,
    in_paste: bool,
    paste: Vec<u8>,
    normalization: Normalization,
}

impl Decoder {
    /// Create a decoder with the given control-byte normalization.
    #[must_use]
    pub fn new(normalization: Normalization) -> Self {
        Self {
            normalization,
            ..Self::default()
        }
    }

    /// Append freshly read bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Whether undecoded bytes are buffered.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Whether a bracketed paste has started but not ended.
    #[must_use]
    pub fn in_paste(&self) -> bool {
        self.in_paste
    }

    /// Remove and return all undecoded bytes.
    pub fn take_pending(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending)
    }

    /// Drop all buffered state.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.paste.clear();
        self.in_paste = false;
    }

    /// Decode the next complete event, or `None` if more input is needed.
    pub fn next_event(&mut self) -> Option<Event> {
        loop {
            if self.in_paste {
                return self.next_paste();
            }
            if self.pending.is_empty() {
                return None;
            }
            let Step::Event(event, consumed) = self.decode(&self.pending) else {
                return None;
            };
            self.pending.drain(..consumed);

            if let Event::Key(key) = &event {
                if key.code == KeyCode::PasteStart {
                    self.in_paste = true;
                    continue;
                }
            }
            tracing::trace!(?event, consumed, "decoded");
            return Some(event);
        }
    }

    /// Resolve whatever is buffered now that no more bytes are coming soon.
    ///
    /// A lone ESC becomes a standalone Escape key; any other unfinished
    /// prefix is returned as text. A paste in progress keeps waiting.
    pub fn flush(&mut self) -> Option<Event> {
        if let Some(event) = self.next_event() {
            return Some(event);
        }
        if self.in_paste || self.pending.is_empty() {
            return None;
        }
        if self.pending[0] == ESC {
            self.pending.drain(..1);
            return Some(Event::Key(KeyEvent::control(ESC).with_consumed(1)));
        }
        let rest = self.take_pending();
        Some(Event::Text(String::from_utf8_lossy(&rest).into_owned()))
    }

    fn next_paste(&mut self) -> Option<Event> {
        if let Some(pos) = find_subsequence(&self.pending, PASTE_END) {
            self.paste.extend_from_slice(&self.pending[..pos]);
            self.pending.drain(..pos + PASTE_END.len());
            self.in_paste = false;
            let content = std::mem::take(&mut self.paste);
            tracing::trace!(bytes = content.len(), "paste complete");
            return Some(Event::Paste(PasteEvent::new(content)));
        }

        // Hold back a tail that may be the start of the end marker.
        let keep = partial_suffix_len(&self.pending, PASTE_END);
        let take = self.pending.len() - keep;
        self.paste.extend(self.pending.drain(..take));

        if self.paste.len() >= MAX_PASTE_BUFFER_SIZE {
            tracing::warn!(bytes = self.paste.len(), "paste exceeds buffer limit, delivering in parts");
            let content = std::mem::take(&mut self.paste);
            return Some(Event::Paste(PasteEvent::new(content)));
        }
        None
    }

    fn decode(&self, input: &[u8]) -> Step {
        let first = input[0];
        match first {
            ESC => self.decode_escape(input),
            0x00..=0x1f | 0x7f => key(KeyEvent::control(self.normalization.apply(first)), 1),
            0x20..=0x7e => key(KeyEvent::char(first as char), 1),
            _ => decode_utf8(input),
        }
    }

    fn decode_escape(&self, input: &[u8]) -> Step {
        let Some(&second) = input.get(1) else {
            return Step::Incomplete;
        };
        match second {
            b'[' => decode_csi(input),
            b'O' => match input.get(2) {
                None => Step::Incomplete,
                Some(0x40..=0x7e) => sequence(&input[..3]),
                // Not an SS3 final byte: this was Alt-O.
                Some(_) => key(KeyEvent::new(KeyCode::Char('O'), KeyModifiers::ALT), 2),
            },
            0x20..=0x7e => key(
                KeyEvent::new(KeyCode::Char(second as char), KeyModifiers::ALT),
                2,
            ),
            // ESC ESC, ESC + control byte: the first ESC stands alone.
            _ => key(KeyEvent::control(ESC), 1),
        }
    }
}

fn key(event: KeyEvent, consumed: usize) -> Step {
    Step::Event(Event::Key(event.with_consumed(consumed)), consumed)
}

/// Table lookup, falling back to literal text.
fn sequence(bytes: &[u8]) -> Step {
    match table::lookup(bytes) {
        Some(seq) => key(KeyEvent::new(seq.code, seq.modifiers), bytes.len()),
        None => Step::Event(
            Event::Text(String::from_utf8_lossy(bytes).into_owned()),
            bytes.len(),
        ),
    }
}

fn decode_csi(input: &[u8]) -> Step {
    if input.len() < 3 {
        return Step::Incomplete;
    }
    // Linux console: ESC [ [ <letter>
    if input[2] == b'[' {
        if input.len() < 4 {
            return Step::Incomplete;
        }
        return sequence(&input[..4]);
    }
    for (i, &b) in input.iter().enumerate().skip(2) {
        match b {
            0x40..=0x7e => return sequence(&input[..=i]),
            0x20..=0x3f => {}
            // Not a CSI byte: emit what we have as text and resync here.
            _ => {
                return Step::Event(
                    Event::Text(String::from_utf8_lossy(&input[..i]).into_owned()),
                    i,
                );
            }
        }
        if i + 1 >= MAX_CSI_LEN {
            return Step::Event(
                Event::Text(String::from_utf8_lossy(&input[..=i]).into_owned()),
                i + 1,
            );
        }
    }
    Step::Incomplete
}

fn decode_utf8(input: &[u8]) -> Step {
    let expected = match input[0] {
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return key(KeyEvent::char(char::REPLACEMENT_CHARACTER), 1),
    };
    let available = input.len().min(expected);
    if input[1..available].iter().any(|b| b & 0xc0 != 0x80) {
        return key(KeyEvent::char(char::REPLACEMENT_CHARACTER), 1);
    }
    if input.len() < expected {
        return Step::Incomplete;
    }
    match std::str::from_utf8(&input[..expected])
        .ok()
        .and_then(|s| s.chars().next())
    {
        Some(c) => key(KeyEvent::char(c), expected),
        None => key(KeyEvent::char(char::REPLACEMENT_CHARACTER), 1),
    }
}

/// Find a subsequence in a byte slice.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Length of the longest proper prefix of `needle` that ends `haystack`.
fn partial_suffix_len(haystack: &[u8], needle: &[u8]) -> usize {
    (1..needle.len())
        .rev()
        .find(|&n| haystack.len() >= n && haystack.ends_with(&needle[..n]))
        .unwrap_or(0)
}
