//! Fixed key-sequence table.
//!
//! Exact byte sequences sent by VT100/xterm-style terminals (and the Linux
//! console) for named keys. The table is shared by every input backend.

use crate::ansi::sequences::{PASTE_END, PASTE_START};
use crate::input::keyboard::{KeyCode, KeyModifiers};

/// One entry of the sequence table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeySequence {
    pub bytes: &'static [u8],
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Longest sequence in the table.
pub const MAX_SEQUENCE_LEN: usize = 6;

const fn plain(bytes: &'static [u8], code: KeyCode) -> KeySequence {
    KeySequence {
        bytes,
        code,
        modifiers: KeyModifiers::empty(),
    }
}

const fn with(bytes: &'static [u8], code: KeyCode, modifiers: KeyModifiers) -> KeySequence {
    KeySequence {
        bytes,
        code,
        modifiers,
    }
}

const CTRL: KeyModifiers = KeyModifiers::CTRL;
const ALT: KeyModifiers = KeyModifiers::ALT;
const SHIFT: KeyModifiers = KeyModifiers::SHIFT;

/// All known sequences.
pub static SEQUENCES: &[KeySequence] = &[
    // 3 bytes: CSI cursor keys
    plain(b"\x1b[A", KeyCode::Up),
    plain(b"\x1b[B", KeyCode::Down),
    plain(b"\x1b[C", KeyCode::Right),
    plain(b"\x1b[D", KeyCode::Left),
    plain(b"\x1b[H", KeyCode::Home),
    plain(b"\x1b[F", KeyCode::End),
    // 3 bytes: SS3 (application cursor mode, VT100 PF keys)
    plain(b"\x1bOA", KeyCode::Up),
    plain(b"\x1bOB", KeyCode::Down),
    plain(b"\x1bOC", KeyCode::Right),
    plain(b"\x1bOD", KeyCode::Left),
    plain(b"\x1bOH", KeyCode::Home),
    plain(b"\x1bOF", KeyCode::End),
    plain(b"\x1bOP", KeyCode::F(1)),
    plain(b"\x1bOQ", KeyCode::F(2)),
    plain(b"\x1bOR", KeyCode::F(3)),
    plain(b"\x1bOS", KeyCode::F(4)),
    // 4 bytes: editing keypad
    plain(b"\x1b[1~", KeyCode::Home),
    plain(b"\x1b[2~", KeyCode::Insert),
    plain(b"\x1b[3~", KeyCode::Delete),
    plain(b"\x1b[4~", KeyCode::End),
    plain(b"\x1b[5~", KeyCode::PageUp),
    plain(b"\x1b[6~", KeyCode::PageDown),
    plain(b"\x1b[7~", KeyCode::Home),
    plain(b"\x1b[8~", KeyCode::End),
    // 4 bytes: Linux console function keys
    plain(b"\x1b[[A", KeyCode::F(1)),
    plain(b"\x1b[[B", KeyCode::F(2)),
    plain(b"\x1b[[C", KeyCode::F(3)),
    plain(b"\x1b[[D", KeyCode::F(4)),
    plain(b"\x1b[[E", KeyCode::F(5)),
    // 5 bytes: function keys
    plain(b"\x1b[11~", KeyCode::F(1)),
    plain(b"\x1b[12~", KeyCode::F(2)),
    plain(b"\x1b[13~", KeyCode::F(3)),
    plain(b"\x1b[14~", KeyCode::F(4)),
    plain(b"\x1b[15~", KeyCode::F(5)),
    plain(b"\x1b[17~", KeyCode::F(6)),
    plain(b"\x1b[18~", KeyCode::F(7)),
    plain(b"\x1b[19~", KeyCode::F(8)),
    plain(b"\x1b[20~", KeyCode::F(9)),
    plain(b"\x1b[21~", KeyCode::F(10)),
    plain(b"\x1b[23~", KeyCode::F(11)),
    plain(b"\x1b[24~", KeyCode::F(12)),
    // 6 bytes: Ctrl-modified
    with(b"\x1b[1;5A", KeyCode::Up, CTRL),
    with(b"\x1b[1;5B", KeyCode::Down, CTRL),
    with(b"\x1b[1;5C", KeyCode::Right, CTRL),
    with(b"\x1b[1;5D", KeyCode::Left, CTRL),
    with(b"\x1b[1;5H", KeyCode::Home, CTRL),
    with(b"\x1b[1;5F", KeyCode::End, CTRL),
    with(b"\x1b[2;5~", KeyCode::Insert, CTRL),
    // 6 bytes: Alt-modified
    with(b"\x1b[1;3A", KeyCode::Up, ALT),
    with(b"\x1b[1;3B", KeyCode::Down, ALT),
    with(b"\x1b[1;3C", KeyCode::Right, ALT),
    with(b"\x1b[1;3D", KeyCode::Left, ALT),
    // 6 bytes: Shift-modified
    with(b"\x1b[1;2A", KeyCode::Up, SHIFT),
    with(b"\x1b[1;2B", KeyCode::Down, SHIFT),
    with(b"\x1b[1;2C", KeyCode::Right, SHIFT),
    with(b"\x1b[1;2D", KeyCode::Left, SHIFT),
    with(b"\x1b[2;2~", KeyCode::Insert, SHIFT),
    // 6 bytes: bracketed paste markers
    plain(PASTE_START, KeyCode::PasteStart),
    plain(PASTE_END, KeyCode::PasteEnd),
];

/// Find the entry whose bytes equal `bytes` exactly.
#[must_use]
pub fn lookup(bytes: &[u8]) -> Option<&'static KeySequence> {
    if bytes.len() > MAX_SEQUENCE_LEN {
        return None;
    }
    SEQUENCES.iter().find(|seq| seq.bytes == bytes)
}
