//! Console Renderer Module
//!
//! Renderers convert a surface grid to terminal output.

pub mod ansi_ibm;

pub use ansi_ibm::AnsiIbmRenderer;

use crate::core::Grid;

/// Trait for renderers
pub trait Renderer {
    /// Initialize sequence
    fn init(&mut self) -> String;

    /// Shutdown sequence
    fn shutdown(&self) -> String;

    /// Render entire grid
    fn render_full(&mut self, grid: &Grid) -> String;

    /// Render only dirty cells
    fn render_dirty(&mut self, grid: &Grid) -> String;

    /// Move the terminal cursor
    fn cursor_to(&mut self, column: usize, row: usize) -> String;
}
