//! Canvas cell type.

use crate::color::Color;

/// How a cell participates in a wide glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellWidth {
    /// Single-column cell.
    #[default]
    Normal,
    /// First column of a double-width glyph.
    WideHead,
    /// Second column of a double-width glyph; owns no content of its own.
    Continuation,
}

/// One character position on a canvas.
///
/// `'\0'` marks an empty cell, rendered as a space. The `drawn` flag records
/// whether the cell's current content has reached the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
    pub width: CellWidth,
    pub(crate) drawn: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

impl Cell {
    /// Empty cell with default colors.
    #[must_use]
    pub const fn blank() -> Self {
        Self {
            ch: '\0',
            fg: Color::Default,
            bg: Color::Default,
            width: CellWidth::Normal,
            drawn: false,
        }
    }

    /// Single-width cell holding `ch`.
    #[must_use]
    pub const fn new(ch: char, fg: Color, bg: Color) -> Self {
        Self {
            ch,
            fg,
            bg,
            width: CellWidth::Normal,
            drawn: false,
        }
    }

    /// Whether the cell holds no rune.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ch == '\0'
    }

    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        matches!(self.width, CellWidth::Continuation)
    }

    #[must_use]
    pub const fn is_wide_head(&self) -> bool {
        matches!(self.width, CellWidth::WideHead)
    }

    /// Number of terminal columns written when this cell is emitted.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        match self.width {
            CellWidth::Normal => 1,
            CellWidth::WideHead => 2,
            CellWidth::Continuation => 0,
        }
    }

    /// The character that is actually written for this cell.
    #[must_use]
    pub const fn display_char(&self) -> char {
        if self.is_empty() { ' ' } else { self.ch }
    }

    /// Whether the cell has reached the terminal since its last change.
    #[must_use]
    pub const fn is_drawn(&self) -> bool {
        self.drawn
    }

    /// Visual equality: content, colors and width class, ignoring `drawn`.
    #[must_use]
    pub fn same_look(&self, other: &Self) -> bool {
        self.ch == other.ch
            && self.fg == other.fg
            && self.bg == other.bg
            && self.width == other.width
    }
}
