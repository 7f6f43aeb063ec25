//! Grid geometry
//!
//! Dimensions, positions and rectangles used by every drawing call.
//! Positions are plain values owned by the caller; the engine never keeps
//! a drawing cursor of its own.

use serde::{Deserialize, Serialize};

/// Size of a character grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    pub columns: usize,
    pub rows: usize,
}

impl GridDimensions {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    /// Number of cells in the grid, `None` if it does not fit in a `usize`
    pub fn area(&self) -> Option<usize> {
        self.columns.checked_mul(self.rows)
    }

    /// Both axes are non-zero
    pub fn is_valid(&self) -> bool {
        self.columns > 0 && self.rows > 0
    }

    /// Apply a per-axis override: a non-zero override axis wins.
    pub fn with_override(self, over: GridDimensions) -> Self {
        Self {
            columns: if over.columns > 0 { over.columns } else { self.columns },
            rows: if over.rows > 0 { over.rows } else { self.rows },
        }
    }

    /// Whether a position addresses a cell inside the grid
    pub fn contains(&self, pos: CursorPosition) -> bool {
        pos.column < self.columns && pos.row < self.rows
    }
}

/// A (column, row) position on a grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CursorPosition {
    pub column: usize,
    pub row: usize,
}

impl CursorPosition {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    pub fn origin() -> Self {
        Self::default()
    }

    /// Advance past `len` written cells on a grid `width` columns wide.
    ///
    /// The column only wraps once it is strictly past the width, so a write
    /// ending exactly on the last column leaves the cursor at `width` on the
    /// same row.
    pub fn advance(&mut self, len: usize, width: usize) {
        self.column = self.column.saturating_add(len);
        if width == 0 || self.column <= width {
            return;
        }
        let wraps = (self.column - 1) / width;
        self.row = self.row.saturating_add(wraps);
        self.column -= wraps * width;
    }
}

/// A rectangle given by its top-left corner and (width, height)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub top_left: CursorPosition,
    pub width: usize,
    pub height: usize,
}

impl Rectangle {
    pub fn new(column: usize, row: usize, width: usize, height: usize) -> Self {
        Self {
            top_left: CursorPosition::new(column, row),
            width,
            height,
        }
    }

    /// Column of the right edge
    pub fn right(&self) -> usize {
        self.top_left
            .column
            .saturating_add(self.width.saturating_sub(1))
    }

    /// Row of the bottom edge
    pub fn bottom(&self) -> usize {
        self.top_left
            .row
            .saturating_add(self.height.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_advance_wraps_once() {
        let mut pos = CursorPosition::new(9, 4);
        pos.advance(3, 10);
        assert_eq!(pos, CursorPosition::new(2, 5));
    }

    #[test]
    fn test_advance_exact_fill_does_not_wrap() {
        let mut pos = CursorPosition::new(7, 0);
        pos.advance(3, 10);
        assert_eq!(pos, CursorPosition::new(10, 0));

        let mut pos = CursorPosition::new(7, 0);
        pos.advance(4, 10);
        assert_eq!(pos, CursorPosition::new(1, 1));
    }

    #[test]
    fn test_advance_multiple_rows() {
        let mut pos = CursorPosition::new(0, 0);
        pos.advance(25, 10);
        assert_eq!(pos, CursorPosition::new(5, 2));
    }

    #[test]
    fn test_advance_zero_width() {
        let mut pos = CursorPosition::new(3, 1);
        pos.advance(4, 0);
        assert_eq!(pos, CursorPosition::new(7, 1));
    }

    #[test]
    fn test_advance_far_column_wraps_in_one_step() {
        let mut pos = CursorPosition::new(50_000_000_000, 0);
        pos.advance(1, 80);
        assert_eq!(pos.row, 50_000_000_000 / 80);
        assert_eq!(pos.column, 1);
    }

    #[test]
    fn test_advance_saturates() {
        let mut pos = CursorPosition::new(usize::MAX - 1, usize::MAX);
        pos.advance(10, 0);
        assert_eq!(pos, CursorPosition::new(usize::MAX, usize::MAX));

        let mut pos = CursorPosition::new(usize::MAX - 1, usize::MAX);
        pos.advance(10, 80);
        assert_eq!(pos.row, usize::MAX);
        assert!(pos.column >= 1 && pos.column <= 80);
    }

    #[test]
    fn test_area_overflow() {
        assert_eq!(GridDimensions::new(80, 25).area(), Some(2000));
        assert_eq!(GridDimensions::new(usize::MAX, 2).area(), None);
    }

    #[test]
    fn test_override_per_axis() {
        let window = GridDimensions::new(80, 25);
        assert_eq!(window.with_override(GridDimensions::new(0, 0)), window);
        assert_eq!(
            window.with_override(GridDimensions::new(120, 0)),
            GridDimensions::new(120, 25)
        );
        assert_eq!(
            window.with_override(GridDimensions::new(0, 50)),
            GridDimensions::new(80, 50)
        );
    }

    #[test]
    fn test_rectangle_edges() {
        let rect = Rectangle::new(2, 3, 10, 4);
        assert_eq!(rect.right(), 11);
        assert_eq!(rect.bottom(), 6);

        let far = Rectangle::new(usize::MAX - 1, usize::MAX, 5, 3);
        assert_eq!(far.right(), usize::MAX);
        assert_eq!(far.bottom(), usize::MAX);
    }

    proptest! {
        #[test]
        fn prop_advance_matches_wrap_formula(
            width in 1usize..200,
            start in 0usize..200,
            len in 0usize..1000,
        ) {
            let start = start % (width + 1);
            let mut pos = CursorPosition::new(start, 0);
            pos.advance(len, width);

            let total = start + len;
            prop_assert!(pos.column <= width);
            if total <= width {
                prop_assert_eq!(pos, CursorPosition::new(total, 0));
            } else {
                prop_assert_eq!(pos.column, (total - 1) % width + 1);
                prop_assert_eq!(pos.row, (total - 1) / width);
            }
        }
    }
}
