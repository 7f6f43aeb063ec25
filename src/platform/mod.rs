//! Platform Console Module
//!
//! The text-console subsystem the engine drives. A `Console` creates
//! off-screen surfaces, chooses which one is rendered, reads and writes
//! their cells, and supplies raw keystrokes.
//!
//! Surfaces are owned values: dropping one releases it on the platform.

pub mod memory;
pub mod terminal;

pub use memory::{Ledger, MemoryConsole, MemorySurface};
pub use terminal::{TerminalConsole, TerminalSurface};

use crate::core::{CursorPosition, Grid, GridDimensions};
use crate::error::Result;
use crate::keymap;

/// Platform identity of a surface
pub type SurfaceId = u32;

/// Visible window geometry reported by the platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowInfo {
    pub dimensions: GridDimensions,
    pub cursor: CursorPosition,
}

/// An allocated character surface
pub trait Surface {
    /// Platform identity, stable for the life of the surface
    fn id(&self) -> SurfaceId;

    /// Size the surface was allocated with
    fn dimensions(&self) -> GridDimensions;

    /// Presentation cursor of this surface
    fn cursor(&self) -> CursorPosition;

    /// Cell storage
    fn grid(&self) -> &Grid;
}

/// Trait for platform consoles
pub trait Console {
    type Surface: Surface;

    /// Backend name
    fn name(&self) -> &str;

    /// Query the visible window size and cursor
    fn window_info(&mut self) -> Result<WindowInfo>;

    /// Give up the primary screen so only engine surfaces are live
    fn release_primary(&mut self) -> Result<()>;

    /// Allocate a blank surface of fixed size
    fn create_surface(&mut self, dims: GridDimensions) -> Result<Self::Surface>;

    /// Make a surface the one the platform renders
    fn activate(&mut self, surface: &mut Self::Surface) -> Result<()>;

    /// Write glyphs at a cell, returning how many were written
    fn write_chars(
        &mut self,
        surface: &mut Self::Surface,
        pos: CursorPosition,
        glyphs: &[u8],
    ) -> Result<usize>;

    /// Repeat a glyph from a cell, returning how many were written
    fn fill_chars(
        &mut self,
        surface: &mut Self::Surface,
        pos: CursorPosition,
        glyph: u8,
        count: usize,
    ) -> Result<usize>;

    /// Read the glyph stored at a cell
    fn read_char(&mut self, surface: &Self::Surface, pos: CursorPosition) -> Result<u8>;

    /// Move a surface's presentation cursor
    fn set_cursor(&mut self, surface: &mut Self::Surface, pos: CursorPosition) -> Result<()>;

    /// Whether a raw key code can be read without blocking
    fn key_available(&mut self) -> Result<bool>;

    /// Read one raw key code, blocking until one arrives
    fn read_key(&mut self) -> Result<i32>;

    /// Translate a key code through the active keyboard layout
    fn scan_translate(&self, code: i32) -> i16 {
        keymap::vk_key_scan(code)
    }
}
