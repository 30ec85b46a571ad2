//! Frame composition: turning a grid into terminal bytes.

use crate::ansi::{FrameWriter, sequences};
use crate::canvas::diff::FrameDiff;
use crate::canvas::grid::Grid;

/// How cells are written to the terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmissionMode {
    /// Cursor placed once, cells streamed in row-major order relying on
    /// the terminal's own advance and wrap.
    #[default]
    Batched,
    /// Absolute cursor position before every cell. Slower, but immune to
    /// disagreements about glyph widths (multiplexers).
    PerCell,
}

/// One composed frame.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    /// Bytes to send, not including cursor or line-wrap bookkeeping.
    pub bytes: Vec<u8>,
    /// Number of cells in the frame.
    pub cells: usize,
    /// Whether every cell was emitted.
    pub full: bool,
}

impl Frame {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Compose the bytes that turn the terminal from showing `rendered` into
/// showing `grid`.
///
/// Without a rendered frame of the same size every cell is emitted; a full
/// frame assumes line wrap is enabled while it is written. Otherwise only
/// changed cells are emitted and nothing at all if none changed.
/// `line_wrap` is the terminal's wrap state for incremental frames.
#[must_use]
pub fn compose(
    grid: &Grid,
    rendered: Option<&Grid>,
    mode: EmissionMode,
    line_wrap: bool,
) -> Frame {
    let per_cell = mode == EmissionMode::PerCell;
    let width = grid.width();

    let Some(rendered) = rendered.filter(|r| r.size() == grid.size()) else {
        let mut out = FrameWriter::new(width, per_cell, true);
        if per_cell {
            out.write_str(sequences::CLEAR_SCREEN);
        } else {
            out.home();
        }
        for (i, cell) in grid.cells().iter().enumerate() {
            let (x, y) = (i as u32 % width, i as u32 / width);
            out.put_cell(y, x, cell);
        }
        let cells = out.cells_written();
        return Frame {
            bytes: out.finish(),
            cells,
            full: true,
        };
    };

    let diff = FrameDiff::compute(grid, rendered);
    if diff.is_empty() {
        return Frame::default();
    }
    let mut out = FrameWriter::new(width, per_cell, line_wrap);
    for &(x, y) in &diff.changed_cells {
        if let Some(cell) = grid.get(x, y) {
            out.put_cell(y, x, cell);
        }
    }
    let cells = out.cells_written();
    Frame {
        bytes: out.finish(),
        cells,
        full: false,
    }
}
