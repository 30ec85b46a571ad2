//! Grid diffing for incremental frames.

use crate::canvas::grid::Grid;

/// Cells that must be re-emitted to turn the last rendered frame into the
/// current grid.
#[derive(Clone, Debug, Default)]
pub struct FrameDiff {
    /// Changed cell positions (x, y) in row-major order. Continuation cells
    /// never appear; a changed continuation marks its head instead.
    pub changed_cells: Vec<(u32, u32)>,
}

impl FrameDiff {
    /// Compare the live grid against the last rendered one.
    ///
    /// A cell is changed when it looks different from the rendered cell or
    /// has been marked not yet rendered. Both grids must have the same size.
    #[must_use]
    pub fn compute(current: &Grid, rendered: &Grid) -> Self {
        debug_assert_eq!(current.size(), rendered.size());
        let (width, height) = current.size();
        let mut changed_cells = Vec::new();

        for y in 0..height {
            let (Some(row), Some(old_row)) = (current.row(y), rendered.row(y)) else {
                break;
            };
            let mut pending_head = false;
            for x in (0..width).rev() {
                let cell = &row[x as usize];
                let dirty = !cell.is_drawn() || !cell.same_look(&old_row[x as usize]);
                if cell.is_continuation() {
                    pending_head = dirty;
                    continue;
                }
                if dirty || pending_head {
                    changed_cells.push((x, y));
                }
                pending_head = false;
            }
        }
        // Rows were scanned right to left; restore row-major order.
        changed_cells.sort_unstable_by_key(|&(x, y)| (y, x));

        Self { changed_cells }
    }

    /// Check if there are any changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_cells.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changed_cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn rendered(grid: &Grid) -> (Grid, Grid) {
        let shown = grid.clone();
        let mut live = grid.clone();
        live.mark_drawn_matching(&shown);
        (live, shown)
    }

    #[test]
    fn test_identical_grids_produce_empty_diff() {
        let mut grid = Grid::new(5, 3);
        grid.write_str(0, 0, Color::Default, Color::Default, "hello");
        let (live, shown) = rendered(&grid);
        assert!(FrameDiff::compute(&live, &shown).is_empty());
    }

    #[test]
    fn test_undrawn_cells_are_changed() {
        let grid = Grid::new(3, 1);
        let diff = FrameDiff::compute(&grid, &grid.clone());
        assert_eq!(diff.len(), 3);
    }

    #[test]
    fn test_changed_cells_in_row_major_order() {
        let (mut live, shown) = rendered(&Grid::new(4, 3));
        live.plot(3, 2, 'c');
        live.plot(0, 1, 'b');
        live.plot(2, 0, 'a');
        let diff = FrameDiff::compute(&live, &shown);
        assert_eq!(diff.changed_cells, vec![(2, 0), (0, 1), (3, 2)]);
    }

    #[test]
    fn test_color_only_change_detected() {
        let (mut live, shown) = rendered(&Grid::new(2, 1));
        live.write_background(1, 0, Color::RED);
        let diff = FrameDiff::compute(&live, &shown);
        assert_eq!(diff.changed_cells, vec![(1, 0)]);
    }

    #[test]
    fn test_wide_glyph_reported_as_head_only() {
        let (mut live, shown) = rendered(&Grid::new(10, 1));
        live.write_wide_rune(5, 0, Color::Default, Color::Default, '中');
        let diff = FrameDiff::compute(&live, &shown);
        assert_eq!(diff.changed_cells, vec![(5, 0)]);
    }
}
