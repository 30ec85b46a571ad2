//! ANSI escape sequence generation.

pub mod output;
pub mod sequences;

pub use output::FrameWriter;
pub use sequences::*;

use crate::color::Color;
use std::io::{self, Write};

/// Write a u32 as decimal digits to a writer without formatting overhead.
///
/// Stack buffer is sized for max u32 digits (10) to avoid heap allocation.
#[inline]
pub(crate) fn write_u32_decimal(w: &mut impl Write, n: u32) -> io::Result<()> {
    if n < 10 {
        return w.write_all(&[b'0' + n as u8]);
    }
    if n < 100 {
        return w.write_all(&[b'0' + (n / 10) as u8, b'0' + (n % 10) as u8]);
    }

    let mut buf = [0u8; 10];
    let mut i = buf.len();
    let mut val = n;
    while val > 0 {
        i -= 1;
        buf[i] = b'0' + (val % 10) as u8;
        val /= 10;
    }
    w.write_all(&buf[i..])
}

/// Write an absolute cursor position (CUP). `row` and `col` are 0-based.
pub fn write_cursor_position(w: &mut impl Write, row: u32, col: u32) -> io::Result<()> {
    w.write_all(b"\x1b[")?;
    write_u32_decimal(w, row + 1)?;
    w.write_all(b";")?;
    write_u32_decimal(w, col + 1)?;
    w.write_all(b"H")
}

/// Generate an absolute cursor position sequence.
#[must_use]
pub fn cursor_position(row: u32, col: u32) -> String {
    format!("\x1b[{};{}H", row + 1, col + 1)
}

/// Write one combined SGR sequence selecting both colors.
///
/// Foreground and background always travel together so a single escape
/// fully determines the attribute state of the following text.
pub fn write_colors(w: &mut impl Write, fg: Color, bg: Color) -> io::Result<()> {
    w.write_all(b"\x1b[")?;
    fg.write_fg_params(w)?;
    w.write_all(b";")?;
    bg.write_bg_params(w)?;
    w.write_all(b"m")
}
