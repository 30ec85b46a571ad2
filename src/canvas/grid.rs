//! Fixed-size cell grid with clipped mutators.
//!
//! All mutators silently ignore coordinates outside the grid. Writing over
//! either half of a wide glyph dissolves the pair so a continuation cell
//! always directly follows its head.

use crate::cell::{Cell, CellWidth};
use crate::color::Color;
use crate::error::{Error, Result};
use std::fmt;
use unicode_width::UnicodeWidthChar;

/// A `width` x `height` array of cells in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a blank grid. Dimensions are clamped to at least 1x1.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![Cell::blank(); width as usize * height as usize],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One row of cells.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = (y * self.width) as usize;
        Some(&self.cells[start..start + self.width as usize])
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Cell at a position, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Strict accessor for a cell.
    pub fn cell(&self, x: u32, y: u32) -> Result<Cell> {
        self.get(x, y).copied().ok_or(Error::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    /// Strict accessor for the rune at a position. Empty and continuation
    /// cells yield `'\0'`.
    pub fn at(&self, x: u32, y: u32) -> Result<char> {
        self.cell(x, y).map(|c| c.ch)
    }

    // ============================================
    // Mutators
    // ============================================

    /// Break up the wide pair `idx` belongs to, leaving the partner blank.
    fn dissolve(&mut self, idx: usize) {
        let partner = match self.cells[idx].width {
            CellWidth::Normal => return,
            CellWidth::WideHead => idx + 1,
            CellWidth::Continuation => idx - 1,
        };
        let other = &mut self.cells[partner];
        other.ch = '\0';
        other.width = CellWidth::Normal;
        other.drawn = false;
        self.cells[idx].width = CellWidth::Normal;
    }

    /// Index of the cell that owns the content at `idx`.
    fn owner(&self, idx: usize) -> usize {
        if self.cells[idx].is_continuation() {
            idx - 1
        } else {
            idx
        }
    }

    fn set_rune(&mut self, idx: usize, ch: char, fg: Color, bg: Color) {
        self.dissolve(idx);
        self.cells[idx] = Cell::new(ch, fg, bg);
    }

    /// Store `ch` at `(x, y)` with the given colors, or the cell's own colors
    /// where `None`. Wide runes get their continuation cell and are ignored
    /// in the last column.
    fn put(&mut self, x: u32, y: u32, ch: char, fg: Option<Color>, bg: Option<Color>) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let Some((ch, columns)) = cell_rune(ch) else {
            return;
        };
        let fg = fg.unwrap_or(self.cells[idx].fg);
        let bg = bg.unwrap_or(self.cells[idx].bg);
        if columns == 2 {
            self.put_pair(x, y, fg, bg, ch);
        } else {
            self.set_rune(idx, ch, fg, bg);
        }
    }

    fn put_pair(&mut self, x: u32, y: u32, fg: Color, bg: Color, ch: char) {
        if x.saturating_add(1) >= self.width {
            return;
        }
        let Some(idx) = self.index(x, y) else {
            return;
        };
        self.dissolve(idx);
        self.dissolve(idx + 1);
        self.cells[idx] = Cell {
            ch,
            fg,
            bg,
            width: CellWidth::WideHead,
            drawn: false,
        };
        self.cells[idx + 1] = Cell {
            ch: '\0',
            fg,
            bg,
            width: CellWidth::Continuation,
            drawn: false,
        };
    }

    /// Put a rune, keeping the cell's colors.
    pub fn plot(&mut self, x: u32, y: u32, ch: char) {
        self.put(x, y, ch, None, None);
    }

    /// Put a rune with a foreground color, keeping the background.
    pub fn plot_color(&mut self, x: u32, y: u32, fg: Color, ch: char) {
        self.put(x, y, ch, Some(fg), None);
    }

    /// Put a rune with both colors.
    pub fn write_rune(&mut self, x: u32, y: u32, fg: Color, bg: Color, ch: char) {
        self.put(x, y, ch, Some(fg), Some(bg));
    }

    /// Put a rune over two columns at `x` and `x + 1`. Ignored when the pair
    /// does not fit on the row. A rune that is really single-width is
    /// written followed by a blank cell.
    pub fn write_wide_rune(&mut self, x: u32, y: u32, fg: Color, bg: Color, ch: char) {
        if x.saturating_add(1) >= self.width || y >= self.height {
            return;
        }
        match cell_rune(ch) {
            Some((ch, 2)) => self.put_pair(x, y, fg, bg, ch),
            Some((ch, _)) => {
                self.write_rune(x, y, fg, bg, ch);
                self.write_rune(x + 1, y, fg, bg, '\0');
            }
            None => {}
        }
    }

    /// Write a string starting at `(x, y)`, continuing on the next row at
    /// the right edge. Double-width characters take two cells and are moved
    /// to the next row rather than split. Zero-width characters are dropped.
    pub fn write_str(&mut self, x: u32, y: u32, fg: Color, bg: Color, s: &str) {
        self.write_flow(x, y, fg, bg, s.chars());
    }

    /// Write `count` copies of a rune in row-major order from `(x, y)`,
    /// stopping at the end of the grid.
    pub fn write_runes(&mut self, x: u32, y: u32, fg: Color, bg: Color, ch: char, count: usize) {
        self.write_flow(x, y, fg, bg, std::iter::repeat_n(ch, count));
    }

    fn write_flow(&mut self, x: u32, y: u32, fg: Color, bg: Color, chars: impl Iterator<Item = char>) {
        let (mut x, mut y) = (x, y);
        if x >= self.width {
            return;
        }
        for ch in chars {
            if y >= self.height {
                break;
            }
            let Some((ch, columns)) = cell_rune(ch) else {
                continue;
            };
            if columns == 2 {
                if x + 1 >= self.width {
                    self.write_rune(x, y, fg, bg, '\0');
                    x = 0;
                    y += 1;
                    if y >= self.height {
                        break;
                    }
                }
                self.put_pair(x, y, fg, bg, ch);
                x += 2;
            } else {
                self.write_rune(x, y, fg, bg, ch);
                x += 1;
            }
            if x >= self.width {
                x = 0;
                y += 1;
            }
        }
    }

    /// Change only the background of a cell (or of the wide glyph it belongs to).
    pub fn write_background(&mut self, x: u32, y: u32, bg: Color) {
        if let Some(idx) = self.index(x, y) {
            self.set_background(idx, bg);
        }
    }

    /// Change the background, and put `ch` there if the cell holds nothing.
    pub fn write_background_add_rune_if_empty(&mut self, x: u32, y: u32, bg: Color, ch: char) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let owner = self.set_background(idx, bg);
        let cell = &self.cells[owner];
        if cell.is_empty() && cell.width == CellWidth::Normal {
            let owner = owner as u32;
            self.put(owner % self.width, owner / self.width, ch, None, None);
        }
    }

    fn set_background(&mut self, idx: usize, bg: Color) -> usize {
        let owner = self.owner(idx);
        self.cells[owner].bg = bg;
        self.cells[owner].drawn = false;
        if self.cells[owner].is_wide_head() {
            self.cells[owner + 1].bg = bg;
            self.cells[owner + 1].drawn = false;
        }
        owner
    }

    /// Set the foreground of every cell.
    pub fn fill(&mut self, fg: Color) {
        for cell in &mut self.cells {
            cell.fg = fg;
            cell.drawn = false;
        }
    }

    /// Set the background of every cell.
    pub fn fill_background(&mut self, bg: Color) {
        for cell in &mut self.cells {
            cell.bg = bg;
            cell.drawn = false;
        }
    }

    /// Remove every rune, keeping colors.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.ch = '\0';
            cell.width = CellWidth::Normal;
            cell.drawn = false;
        }
    }

    /// Mark every cell as not yet rendered.
    pub fn mark_all_undrawn(&mut self) {
        for cell in &mut self.cells {
            cell.drawn = false;
        }
    }

    /// Mark cells that look the same as in `rendered` as drawn.
    pub(crate) fn mark_drawn_matching(&mut self, rendered: &Self) {
        if self.size() != rendered.size() {
            return;
        }
        for (cell, shown) in self.cells.iter_mut().zip(&rendered.cells) {
            if cell.same_look(shown) {
                cell.drawn = true;
            }
        }
    }

    /// A grid of the new size holding the overlapping region of this one.
    /// Copied cells are marked not yet rendered; a wide head whose
    /// continuation falls outside the new width becomes blank.
    #[must_use]
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let mut grid = Self::new(width, height);
        let copy_w = self.width.min(grid.width);
        let copy_h = self.height.min(grid.height);
        for y in 0..copy_h {
            for x in 0..copy_w {
                let mut cell = self.cells[(y * self.width + x) as usize];
                if cell.is_wide_head() && x + 1 >= grid.width {
                    cell.ch = '\0';
                    cell.width = CellWidth::Normal;
                }
                cell.drawn = false;
                grid.cells[(y * grid.width + x) as usize] = cell;
            }
        }
        grid
    }
}

/// Stand-in stored for control characters, which the terminal would act on
/// instead of printing.
pub const REPLACEMENT_CHAR: char = '\u{fffd}';

/// The rune a cell stores for `ch` and the columns it occupies. `None` for
/// zero-width characters, which get no cell of their own.
fn cell_rune(ch: char) -> Option<(char, u32)> {
    if ch == '\0' {
        return Some((ch, 1));
    }
    if ch.is_control() {
        return Some((REPLACEMENT_CHAR, 1));
    }
    match ch.width() {
        Some(0) | None => None,
        Some(2) => Some((ch, 2)),
        Some(_) => Some((ch, 1)),
    }
}

impl fmt::Display for Grid {
    /// One line per row; empty cells print as spaces and continuation cells
    /// are skipped so wide glyphs keep their visual width.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width as usize) {
            for cell in row.iter().filter(|c| !c.is_continuation()) {
                write!(f, "{}", cell.display_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
