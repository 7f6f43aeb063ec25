//! Console Cell Grid - The surface storage
//!
//! A 2D array of cells addressed like a text-mode screen buffer: writes and
//! fills run linearly in row-major order, so text running past the right
//! edge continues on the next hardware line and is clipped at the end of
//! the buffer.

use super::cell::{Cell, BLANK};
use super::geometry::{CursorPosition, GridDimensions};
use crate::error::{ConsoleError, Result};

/// Box drawing glyph sets (code page 437)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxChars {
    pub tl: u8,     // Top-left corner
    pub top: u8,    // Top edge
    pub tr: u8,     // Top-right corner
    pub left: u8,   // Left edge
    pub right: u8,  // Right edge
    pub bl: u8,     // Bottom-left corner
    pub bottom: u8, // Bottom edge
    pub br: u8,     // Bottom-right corner
}

/// Predefined box styles
pub mod box_styles {
    use super::BoxChars;

    /// Single top edge, double left and bottom edges
    pub const CLASSIC: BoxChars = BoxChars {
        tl: 214, top: 196, tr: 191,
        left: 186, right: 179,
        bl: 200, bottom: 205, br: 190,
    };

    pub const SINGLE: BoxChars = BoxChars {
        tl: 218, top: 196, tr: 191,
        left: 179, right: 179,
        bl: 192, bottom: 196, br: 217,
    };

    pub const DOUBLE: BoxChars = BoxChars {
        tl: 201, top: 205, tr: 187,
        left: 186, right: 186,
        bl: 200, bottom: 205, br: 188,
    };

    pub const ASCII: BoxChars = BoxChars {
        tl: b'+', top: b'-', tr: b'+',
        left: b'|', right: b'|',
        bl: b'+', bottom: b'-', br: b'+',
    };
}

/// A character grid - one surface worth of cells
#[derive(Debug, Clone)]
pub struct Grid {
    dims: GridDimensions,
    /// The cell buffer (row-major order)
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a blank grid with given dimensions.
    ///
    /// Fails with `Allocation` when the cell buffer cannot be reserved.
    pub fn new(dims: GridDimensions) -> Result<Self> {
        let area = dims.area().ok_or_else(|| {
            ConsoleError::Allocation(format!("{}x{} cells overflow", dims.columns, dims.rows))
        })?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(area)
            .map_err(|e| ConsoleError::Allocation(format!("{} cells: {}", area, e)))?;
        cells.resize(area, Cell::default());
        Ok(Self { dims, cells })
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    /// Number of cells in the buffer
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Get the linear index for a position
    #[inline]
    fn index(&self, pos: CursorPosition) -> Result<usize> {
        if self.dims.contains(pos) {
            Ok(pos.row * self.dims.columns + pos.column)
        } else {
            Err(ConsoleError::OutOfBounds {
                column: pos.column,
                row: pos.row,
            })
        }
    }

    /// Read the glyph stored at a position
    pub fn glyph_at(&self, pos: CursorPosition) -> Result<u8> {
        let i = self.index(pos)?;
        Ok(self.cells[i].glyph)
    }

    /// Write glyphs starting at `pos`, returning how many cells were written
    pub fn write(&mut self, pos: CursorPosition, glyphs: &[u8]) -> Result<usize> {
        let start = self.index(pos)?;
        let mut written = 0;
        for (cell, &glyph) in self.cells[start..].iter_mut().zip(glyphs) {
            cell.set_glyph(glyph);
            written += 1;
        }
        Ok(written)
    }

    /// Repeat a glyph `count` times starting at `pos`
    pub fn fill(&mut self, pos: CursorPosition, glyph: u8, count: usize) -> Result<usize> {
        let start = self.index(pos)?;
        let end = start.saturating_add(count).min(self.cells.len());
        for cell in &mut self.cells[start..end] {
            cell.set_glyph(glyph);
        }
        Ok(end - start)
    }

    /// Whether every cell holds the blank glyph
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.glyph == BLANK)
    }

    /// Mark all cells as clean
    pub fn mark_all_clean(&mut self) {
        for cell in &mut self.cells {
            cell.dirty = false;
        }
    }

    /// Get iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (CursorPosition, &Cell)> {
        let cols = self.dims.columns;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (CursorPosition::new(i % cols, i / cols), cell))
    }

    /// Get iterator over dirty cells with positions
    pub fn iter_dirty(&self) -> impl Iterator<Item = (CursorPosition, &Cell)> {
        self.iter().filter(|(_, cell)| cell.dirty)
    }

    /// The glyphs of one row
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        if row >= self.dims.rows {
            return None;
        }
        let start = row * self.dims.columns;
        Some(&self.cells[start..start + self.dims.columns])
    }

    /// One row as text, glyphs above 0x7f shown as '?'
    pub fn row_text(&self, row: usize) -> Option<String> {
        self.row(row).map(|cells| {
            cells
                .iter()
                .map(|c| match c.glyph {
                    0 => ' ',
                    g if g.is_ascii() => g as char,
                    _ => '?',
                })
                .collect()
        })
    }
}
