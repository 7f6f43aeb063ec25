//! Error types for console operations

use std::io;
use thiserror::Error;

/// Console error type
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// I/O error from the terminal
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The platform refused to create a surface
    #[error("Failed to allocate surface: {0}")]
    Allocation(String),

    /// Grid dimensions with a zero axis
    #[error("Invalid grid dimensions: {columns}x{rows}")]
    InvalidDimensions { columns: usize, rows: usize },

    /// A cell coordinate outside the surface
    #[error("Position ({column}, {row}) is outside the surface")]
    OutOfBounds { column: usize, row: usize },

    /// Malformed configuration or command
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;
