//! IBM PC ANSI Renderer
//!
//! Renders code page 437 surfaces to ANSI terminals.
//! - Glyphs 0x80-0xFF are mapped to their Unicode equivalents
//! - Control glyphs are drawn as spaces

use crate::core::{Cell, Grid};
use super::Renderer;

/// ANSI escape sequences
const CSI: &str = "\x1b[";

/// Code page 437, 0x80-0xFF
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// Map a code page 437 glyph to a printable character
pub fn cp437_to_char(glyph: u8) -> char {
    match glyph {
        0x20..=0x7e => glyph as char,
        0x80..=0xff => CP437_HIGH[(glyph - 0x80) as usize],
        // Sanitize control characters to prevent terminal corruption
        _ => ' ',
    }
}

/// IBM ANSI Renderer
pub struct AnsiIbmRenderer {
    /// Track cursor position for optimization
    cursor_x: usize,
    cursor_y: usize,
}

impl AnsiIbmRenderer {
    pub fn new() -> Self {
        Self {
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    /// Reset internal state
    pub fn reset(&mut self) {
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    /// Generate cursor move sequence
    fn move_cursor(&mut self, x: usize, y: usize) -> String {
        self.cursor_x = x;
        self.cursor_y = y;
        format!("{}{};{}H", CSI, y + 1, x + 1)
    }

    fn render_cell(&mut self, cell: &Cell) -> char {
        self.cursor_x += 1;
        cp437_to_char(cell.glyph)
    }
}

impl Default for AnsiIbmRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for AnsiIbmRenderer {
    fn init(&mut self) -> String {
        self.reset();
        format!("{}?25l{}2J{}H{}0m", CSI, CSI, CSI, CSI)
    }

    fn shutdown(&self) -> String {
        // Reset attributes, show cursor, clear screen, home cursor
        format!("{}0m{}?25h{}2J{}H", CSI, CSI, CSI, CSI)
    }

    fn render_full(&mut self, grid: &Grid) -> String {
        let dims = grid.dimensions();
        let mut output = String::with_capacity(grid.cell_count() * 2 + dims.rows * 8);

        self.reset();

        for y in 0..dims.rows {
            output.push_str(&self.move_cursor(0, y));
            if let Some(cells) = grid.row(y) {
                for cell in cells {
                    output.push(self.render_cell(cell));
                }
            }
        }

        output
    }

    fn render_dirty(&mut self, grid: &Grid) -> String {
        let dirty_count = grid.iter_dirty().count();

        // If more than 50% dirty, do full redraw
        if dirty_count > grid.cell_count() / 2 {
            return self.render_full(grid);
        }

        let mut output = String::with_capacity(dirty_count * 10);

        // iter_dirty yields cells in row-major order
        for (pos, cell) in grid.iter_dirty() {
            let contiguous = pos.row == self.cursor_y && pos.column == self.cursor_x;
            if !contiguous {
                output.push_str(&self.move_cursor(pos.column, pos.row));
            }
            output.push(self.render_cell(cell));
        }

        output
    }

    fn cursor_to(&mut self, column: usize, row: usize) -> String {
        self.move_cursor(column, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CursorPosition, GridDimensions};

    #[test]
    fn test_renderer_init() {
        let mut renderer = AnsiIbmRenderer::new();
        let init = renderer.init();
        assert!(init.contains("\x1b[?25l")); // Hide cursor
        assert!(init.contains("\x1b[2J"));   // Clear screen
    }

    #[test]
    fn test_cp437_mapping() {
        assert_eq!(cp437_to_char(b'A'), 'A');
        assert_eq!(cp437_to_char(0x00), ' ');
        assert_eq!(cp437_to_char(0x7f), ' ');
        assert_eq!(cp437_to_char(196), '─');
        assert_eq!(cp437_to_char(186), '║');
        assert_eq!(cp437_to_char(214), '╓');
        assert_eq!(cp437_to_char(190), '╛');
    }

    #[test]
    fn test_render_simple() {
        let mut renderer = AnsiIbmRenderer::new();
        let mut grid = Grid::new(GridDimensions::new(10, 5)).unwrap();
        grid.write(CursorPosition::new(0, 0), b"X").unwrap();

        let output = renderer.render_full(&grid);
        assert!(output.starts_with("\x1b[1;1HX"));
        assert!(output.contains("\x1b[5;1H"));
    }

    #[test]
    fn test_render_dirty_moves_only_when_needed() {
        let mut renderer = AnsiIbmRenderer::new();
        let mut grid = Grid::new(GridDimensions::new(10, 5)).unwrap();
        grid.mark_all_clean();
        grid.write(CursorPosition::new(2, 1), b"ab").unwrap();
        grid.write(CursorPosition::new(7, 3), b"c").unwrap();

        let output = renderer.render_dirty(&grid);
        assert_eq!(output, "\x1b[2;3Hab\x1b[4;8Hc");
    }
}
