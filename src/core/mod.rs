//! Console Core Module
//!
//! Core data structures for the engine:
//! - Geometry: dimensions, positions, rectangles
//! - Cell: Individual glyph cell
//! - Grid: 2D surface storage

pub mod cell;
pub mod geometry;
pub mod grid;

pub use cell::{is_empty_glyph, Cell, BLANK};
pub use geometry::{CursorPosition, GridDimensions, Rectangle};
pub use grid::{box_styles, BoxChars, Grid};
