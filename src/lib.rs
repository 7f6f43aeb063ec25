//! dbcon - Double-buffered text console
//!
//! Draw characters, strings and boxes on an off-screen character grid, then
//! present it to the console in one swap. Keystrokes, including two-code
//! function and arrow keys, are decoded into a single key code.
//!
//! # Overview
//!
//! dbcon provides:
//! - Two equally-sized surfaces (visible and back) allocated once
//! - Fixed-cell and cursor-tracking writes with row wrap
//! - A present operation that swaps surfaces and blanks the new back one
//! - An extended-key input decoder with keyboard-layout translation
//! - A terminal backend (crossterm) and an in-memory backend
//! - A JSON command protocol for scripting
//!
//! # Example
//!
//! ```no_run
//! use dbcon::{ConsoleEngine, CursorPosition, EngineConfig, Rectangle, TerminalConsole};
//!
//! let mut engine = ConsoleEngine::new(TerminalConsole::new(), EngineConfig::default());
//! engine.initialize().expect("console surfaces");
//!
//! engine.draw_rect(Rectangle::new(0, 0, 30, 5), None);
//! let mut pos = CursorPosition::new(2, 2);
//! engine.write_advance(&mut pos, "Hello dbcon!", None);
//! engine.present();
//!
//! let key = engine.poll_input(true);
//! println!("key {}", key);
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod input;
pub mod keymap;
pub mod platform;
pub mod protocol;
pub mod renderer;

// Re-export commonly used types
pub use config::{BoxStyle, EngineConfig};
pub use crate::core::{BoxChars, Cell, CursorPosition, Grid, GridDimensions, Rectangle};
pub use engine::{ConsoleEngine, Target};
pub use error::{ConsoleError, Result};
pub use input::{InputDecoder, InputEvent};
pub use platform::{Console, MemoryConsole, Surface, TerminalConsole};
pub use protocol::{Command, Response, Session};
pub use renderer::{AnsiIbmRenderer, Renderer};
