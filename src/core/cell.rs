//! Console Cell - The fundamental display unit
//!
//! Each cell holds one code-page glyph (a single byte). There are no colors
//! or attributes; a cell is either a glyph or empty.

use serde::{Deserialize, Serialize};

/// The glyph written by a clear
pub const BLANK: u8 = b' ';

/// A blank or NUL glyph shows nothing
pub fn is_empty_glyph(glyph: u8) -> bool {
    glyph == BLANK || glyph == 0
}

/// A single character cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The code-page glyph to display
    pub glyph: u8,
    /// Whether this cell needs redrawing
    #[serde(skip)]
    pub dirty: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            glyph: BLANK,
            dirty: true,
        }
    }
}

impl Cell {
    /// Set glyph and mark dirty
    pub fn set_glyph(&mut self, glyph: u8) {
        if self.glyph != glyph {
            self.glyph = glyph;
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_dirty() {
        let mut cell = Cell::default();
        cell.dirty = false;
        cell.set_glyph(b'X');
        assert!(cell.dirty);
    }

    #[test]
    fn test_same_glyph_stays_clean() {
        let mut cell = Cell {
            glyph: b'X',
            dirty: false,
        };
        cell.set_glyph(b'X');
        assert!(!cell.dirty);
    }

    #[test]
    fn test_empty_glyphs() {
        assert!(is_empty_glyph(Cell::default().glyph));
        assert!(is_empty_glyph(0));
        assert!(!is_empty_glyph(b'a'));
    }
}
