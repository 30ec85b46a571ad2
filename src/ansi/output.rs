//! Frame byte builder with cursor and color state tracking.

use crate::ansi::{self, sequences};
use crate::cell::Cell;
use crate::color::Color;

/// Accumulates one frame of output and tracks terminal state so that color
/// escapes are only written when they change and cursor moves are only
/// written when the cursor is not already in place.
#[derive(Debug)]
pub struct FrameWriter {
    buffer: Vec<u8>,
    width: u32,
    // Last colors emitted in this frame.
    colors: Option<(Color, Color)>,
    // Where the terminal cursor is known to be; `None` when unknown.
    cursor: Option<(u32, u32)>,
    position_every_cell: bool,
    wrapping: bool,
    cells: usize,
}

impl FrameWriter {
    /// Create a writer for a grid `width` columns wide.
    ///
    /// With `position_every_cell` an absolute cursor move precedes every
    /// cell, which is what multiplexers with their own width tables need.
    /// `wrapping` tells the writer the terminal will auto-wrap at the right
    /// margin for the duration of this frame.
    #[must_use]
    pub fn new(width: u32, position_every_cell: bool, wrapping: bool) -> Self {
        Self {
            buffer: Vec::with_capacity(8192),
            width,
            colors: None,
            cursor: None,
            position_every_cell,
            wrapping,
            cells: 0,
        }
    }

    /// Write a raw string to the buffer.
    pub fn write_str(&mut self, s: &str) {
        self.buffer.extend_from_slice(s.as_bytes());
    }

    /// Move the cursor to the origin.
    pub fn home(&mut self) {
        self.write_str(sequences::CURSOR_HOME);
        self.cursor = Some((0, 0));
    }

    /// Move the cursor to `(row, col)` unless it is already there.
    pub fn move_to(&mut self, row: u32, col: u32) {
        if !self.position_every_cell && self.cursor == Some((row, col)) {
            return;
        }
        let _ = ansi::write_cursor_position(&mut self.buffer, row, col);
        self.cursor = Some((row, col));
    }

    /// Emit the color escape if it differs from the previous emitted cell.
    pub fn set_colors(&mut self, fg: Color, bg: Color) {
        if self.colors == Some((fg, bg)) {
            return;
        }
        let _ = ansi::write_colors(&mut self.buffer, fg, bg);
        self.colors = Some((fg, bg));
    }

    /// Emit one cell at `(row, col)`. Continuation cells are never emitted:
    /// the terminal fills them when it draws the wide head.
    pub fn put_cell(&mut self, row: u32, col: u32, cell: &Cell) {
        if cell.is_continuation() {
            return;
        }
        self.move_to(row, col);
        self.set_colors(cell.fg, cell.bg);
        let mut utf8 = [0u8; 4];
        self.buffer
            .extend_from_slice(cell.display_char().encode_utf8(&mut utf8).as_bytes());
        self.cells += 1;

        let next = col + cell.columns();
        self.cursor = if next < self.width {
            Some((row, next))
        } else if self.wrapping {
            Some((row + 1, 0))
        } else {
            None
        };
    }

    /// Number of cells emitted so far.
    #[must_use]
    pub fn cells_written(&self) -> usize {
        self.cells
    }

    /// Whether nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Finish the frame, resetting attributes if any color was set.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        if self.colors.is_some() {
            self.write_str(sequences::RESET);
        }
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellWidth;

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_adjacent_cells_share_one_move_and_one_color() {
        let mut w = FrameWriter::new(10, false, false);
        let cell = Cell::new('a', Color::RED, Color::Default);
        w.put_cell(0, 0, &cell);
        w.put_cell(0, 1, &Cell::new('b', Color::RED, Color::Default));
        assert_eq!(w.cells_written(), 2);
        assert_eq!(text(w.finish()), "\x1b[1;1H\x1b[31;49mab\x1b[0m");
    }

    #[test]
    fn test_color_change_emits_new_escape() {
        let mut w = FrameWriter::new(10, false, false);
        w.put_cell(0, 0, &Cell::new('a', Color::RED, Color::Default));
        w.put_cell(0, 1, &Cell::new('b', Color::GREEN, Color::Default));
        assert_eq!(
            text(w.finish()),
            "\x1b[1;1H\x1b[31;49ma\x1b[32;49mb\x1b[0m"
        );
    }

    #[test]
    fn test_gap_forces_cursor_move() {
        let mut w = FrameWriter::new(10, false, false);
        let cell = Cell::new('a', Color::Default, Color::Default);
        w.put_cell(0, 0, &cell);
        w.put_cell(0, 5, &cell);
        assert_eq!(text(w.finish()), "\x1b[1;1H\x1b[39;49ma\x1b[1;6Ha\x1b[0m");
    }

    #[test]
    fn test_position_every_cell() {
        let mut w = FrameWriter::new(10, true, false);
        let cell = Cell::new('a', Color::Default, Color::Default);
        w.put_cell(0, 0, &cell);
        w.put_cell(0, 1, &cell);
        assert_eq!(
            text(w.finish()),
            "\x1b[1;1H\x1b[39;49ma\x1b[1;2Ha\x1b[0m"
        );
    }

    #[test]
    fn test_wide_head_advances_two_columns() {
        let mut w = FrameWriter::new(10, false, false);
        let mut head = Cell::new('中', Color::Default, Color::Default);
        head.width = CellWidth::WideHead;
        let mut cont = Cell::blank();
        cont.width = CellWidth::Continuation;
        w.put_cell(0, 0, &head);
        w.put_cell(0, 1, &cont);
        w.put_cell(0, 2, &Cell::new('x', Color::Default, Color::Default));
        assert_eq!(w.cells_written(), 2);
        assert_eq!(text(w.finish()), "\x1b[1;1H\x1b[39;49m中x\x1b[0m");
    }

    #[test]
    fn test_wrapping_continues_on_next_row() {
        let mut w = FrameWriter::new(2, false, true);
        w.home();
        let cell = Cell::new('a', Color::Default, Color::Default);
        w.put_cell(0, 0, &cell);
        w.put_cell(0, 1, &cell);
        w.put_cell(1, 0, &cell);
        assert_eq!(text(w.finish()), "\x1b[H\x1b[39;49maaa\x1b[0m");
    }

    #[test]
    fn test_no_wrap_loses_cursor_at_margin() {
        let mut w = FrameWriter::new(2, false, false);
        let cell = Cell::new('a', Color::Default, Color::Default);
        w.put_cell(0, 1, &cell);
        w.put_cell(1, 0, &cell);
        assert_eq!(
            text(w.finish()),
            "\x1b[1;2H\x1b[39;49ma\x1b[2;1Ha\x1b[0m"
        );
    }

    #[test]
    fn test_empty_frame_has_no_reset() {
        let w = FrameWriter::new(4, false, false);
        assert!(w.is_empty());
        assert!(w.finish().is_empty());
    }
}
