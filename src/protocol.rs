//! Console Protocol
//!
//! JSON commands for driving an engine from a script, one command per line.
//! A `Session` keeps the drawing cursor used by the tracked commands
//! (`write`, `write_char`, `fill`, `rect`, `adjust_cursor`).
//!
//! Example:
//! ```json
//! {"cmd": "rect", "x": 0, "y": 0, "width": 20, "height": 5}
//! {"cmd": "move_to", "x": 2, "y": 1}
//! {"cmd": "write", "text": "Hello"}
//! {"cmd": "present"}
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::{CursorPosition, Rectangle};
use crate::engine::{ConsoleEngine, Target};
use crate::platform::Console;

/// Commands accepted by a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Allocate surfaces
    Init,

    /// Blank the back surface
    Clear,

    /// Blank a chosen surface
    ClearSurface {
        #[serde(default)]
        target: Target,
    },

    /// Draw a rectangle border
    Rect {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        #[serde(default)]
        target: Target,
    },

    /// Write text at a fixed cell
    Print {
        x: usize,
        y: usize,
        text: String,
        #[serde(default)]
        target: Target,
    },

    /// Write one character at a fixed cell
    PrintChar {
        x: usize,
        y: usize,
        char: char,
        #[serde(default)]
        target: Target,
    },

    /// Write text at the session cursor
    Write {
        text: String,
        #[serde(default)]
        target: Target,
    },

    /// Write one character at the session cursor
    WriteChar {
        char: char,
        #[serde(default)]
        target: Target,
    },

    /// Move the session cursor
    MoveTo { x: usize, y: usize },

    /// Repeat a character at the session cursor
    Fill {
        char: char,
        width: usize,
        #[serde(default)]
        target: Target,
    },

    /// Swap surfaces
    Present,

    /// Move the visible surface's cursor
    SetCursor { x: usize, y: usize },

    /// Pull the session cursor out of unwritten cells
    AdjustCursor,

    /// Read a key
    Poll {
        #[serde(default = "default_true")]
        blocking: bool,
    },

    /// Forget the last key
    ResetInput,
}

/// Responses from a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Ok,

    /// Session cursor after a tracked command
    Cursor { x: usize, y: usize },

    /// Decoded key
    Key { code: i32, raw: i32, extended: bool },

    Error { message: String },
}

fn default_true() -> bool {
    true
}

/// Characters outside a single byte are not representable
fn glyph(c: char) -> Option<u8> {
    u8::try_from(u32::from(c)).ok()
}

/// Text as glyph bytes, or the offending character
fn glyphs(text: &str) -> Result<Vec<u8>, char> {
    text.chars().map(|c| glyph(c).ok_or(c)).collect()
}

fn unsupported(c: char) -> Response {
    Response::Error {
        message: format!("unsupported character {:?}", c),
    }
}

/// A scripted drawing session over an engine
pub struct Session<C: Console> {
    engine: ConsoleEngine<C>,
    cursor: CursorPosition,
}

impl<C: Console> Session<C> {
    pub fn new(engine: ConsoleEngine<C>) -> Self {
        Self {
            engine,
            cursor: CursorPosition::origin(),
        }
    }

    pub fn engine(&self) -> &ConsoleEngine<C> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ConsoleEngine<C> {
        &mut self.engine
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    fn cursor_response(&self) -> Response {
        Response::Cursor {
            x: self.cursor.column,
            y: self.cursor.row,
        }
    }

    /// Run one command
    pub fn apply(&mut self, cmd: Command) -> Response {
        debug!("Session command: {:?}", cmd);

        match cmd {
            Command::Init => match self.engine.initialize() {
                Ok(()) => Response::Ok,
                Err(e) => Response::Error {
                    message: e.to_string(),
                },
            },
            Command::Clear => {
                self.engine.clear();
                Response::Ok
            }
            Command::ClearSurface { target } => {
                self.engine.clear_surface(target);
                Response::Ok
            }
            Command::Rect {
                x,
                y,
                width,
                height,
                target,
            } => {
                self.cursor = self
                    .engine
                    .draw_rect(Rectangle::new(x, y, width, height), Some(target));
                self.cursor_response()
            }
            Command::Print { x, y, text, target } => match glyphs(&text) {
                Ok(bytes) => {
                    self.engine.write_at(x, y, bytes, Some(target));
                    Response::Ok
                }
                Err(c) => unsupported(c),
            },
            Command::PrintChar { x, y, char, target } => match glyph(char) {
                Some(g) => {
                    self.engine.write_char_at(x, y, g, Some(target));
                    Response::Ok
                }
                None => unsupported(char),
            },
            Command::Write { text, target } => match glyphs(&text) {
                Ok(bytes) => {
                    self.engine.write_advance(&mut self.cursor, bytes, Some(target));
                    self.cursor_response()
                }
                Err(c) => unsupported(c),
            },
            Command::WriteChar { char, target } => match glyph(char) {
                Some(g) => {
                    self.engine
                        .write_char_advance(&mut self.cursor, g, Some(target));
                    self.cursor_response()
                }
                None => unsupported(char),
            },
            Command::MoveTo { x, y } => {
                self.cursor = CursorPosition::new(x, y);
                self.cursor_response()
            }
            Command::Fill {
                char,
                width,
                target,
            } => match glyph(char) {
                Some(g) => {
                    self.engine.fill(&mut self.cursor, g, width, Some(target));
                    self.cursor_response()
                }
                None => unsupported(char),
            },
            Command::Present => {
                self.engine.present();
                Response::Ok
            }
            Command::SetCursor { x, y } => {
                self.engine.set_visible_cursor(CursorPosition::new(x, y));
                Response::Ok
            }
            Command::AdjustCursor => {
                self.engine.adjust_cursor(&mut self.cursor);
                self.cursor_response()
            }
            Command::Poll { blocking } => {
                let code = self.engine.poll_input(blocking);
                let last = self.engine.last_input();
                Response::Key {
                    code,
                    raw: last.raw_code,
                    extended: last.is_extended,
                }
            }
            Command::ResetInput => {
                self.engine.reset_input();
                Response::Ok
            }
        }
    }
}

/// Parse a command from JSON
pub fn parse_command(json: &str) -> Result<Command, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serialize a response to JSON
pub fn serialize_response(response: &Response) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| {
        r#"{"type":"error","message":"serialization failed"}"#.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::platform::MemoryConsole;

    fn session(cols: usize, rows: usize) -> Session<MemoryConsole> {
        let engine = ConsoleEngine::new(MemoryConsole::new(cols, rows), EngineConfig::default());
        let mut session = Session::new(engine);
        assert_eq!(session.apply(Command::Init), Response::Ok);
        session
    }

    #[test]
    fn test_parse_init() {
        let cmd = parse_command(r#"{"cmd": "init"}"#).unwrap();
        assert_eq!(cmd, Command::Init);
    }

    #[test]
    fn test_parse_print() {
        let cmd = parse_command(r#"{"cmd": "print", "x": 1, "y": 2, "text": "Hi"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Print {
                x: 1,
                y: 2,
                text: "Hi".to_string(),
                target: Target::Back,
            }
        );

        let cmd = parse_command(r#"{"cmd": "clear_surface", "target": "visible"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::ClearSurface {
                target: Target::Visible
            }
        );
    }

    #[test]
    fn test_parse_poll_defaults_blocking() {
        let cmd = parse_command(r#"{"cmd": "poll"}"#).unwrap();
        assert_eq!(cmd, Command::Poll { blocking: true });
        assert!(parse_command(r#"{"cmd": "explode"}"#).is_err());
    }

    #[test]
    fn test_serialize_response() {
        let json = serialize_response(&Response::Key {
            code: 72,
            raw: 72,
            extended: true,
        });
        assert_eq!(json, r#"{"type":"key","code":72,"raw":72,"extended":true}"#);
        assert_eq!(serialize_response(&Response::Ok), r#"{"type":"ok"}"#);
    }

    #[test]
    fn test_tracked_commands_share_cursor() {
        let mut session = session(10, 4);
        session.apply(Command::MoveTo { x: 8, y: 0 });
        let response = session.apply(Command::Write {
            text: "abc".to_string(),
            target: Target::Back,
        });
        assert_eq!(response, Response::Cursor { x: 1, y: 1 });

        let response = session.apply(Command::Fill {
            char: '*',
            width: 2,
            target: Target::Back,
        });
        assert_eq!(response, Response::Cursor { x: 3, y: 1 });

        session.apply(Command::Present);
        let rows = session.engine().snapshot(Target::Visible).unwrap();
        assert_eq!(rows[0], "        ab");
        assert_eq!(rows[1], "c**       ");
    }

    #[test]
    fn test_extreme_script_values_return() {
        let mut session = session(10, 4);
        let rect = parse_command(
            r#"{"cmd": "rect", "x": 18446744073709551614, "y": 0, "width": 5, "height": 3}"#,
        )
        .unwrap();
        assert!(matches!(session.apply(rect), Response::Cursor { .. }));

        session.apply(Command::MoveTo { x: 0, y: 3 });
        let fill = parse_command(r##"{"cmd": "fill", "char": "#", "width": 18446744073709551615}"##)
            .unwrap();
        assert!(matches!(session.apply(fill), Response::Cursor { .. }));

        let rows = session.engine().snapshot(Target::Back).unwrap();
        assert_eq!(rows[0], "          ");
        assert_eq!(rows[3], "##########");
    }

    #[test]
    fn test_non_byte_text_is_rejected() {
        let mut session = session(10, 4);
        let response = session.apply(Command::Write {
            text: "π".to_string(),
            target: Target::Back,
        });
        assert!(matches!(response, Response::Error { .. }));
        assert_eq!(session.cursor(), CursorPosition::origin());
    }

    #[test]
    fn test_poll_reports_key() {
        let mut session = session(10, 4);
        session.engine_mut().console_mut().push_keys(&[0xE0, 80]);
        assert_eq!(
            session.apply(Command::Poll { blocking: false }),
            Response::Key {
                code: 80,
                raw: 80,
                extended: true
            }
        );
        assert_eq!(
            session.apply(Command::Poll { blocking: false }),
            Response::Key {
                code: 0,
                raw: 80,
                extended: true
            }
        );
    }

    #[test]
    fn test_adjust_cursor_command() {
        let mut session = session(10, 4);
        session.apply(Command::Print {
            x: 0,
            y: 2,
            text: "xy".to_string(),
            target: Target::Back,
        });
        session.apply(Command::MoveTo { x: 7, y: 2 });
        assert_eq!(
            session.apply(Command::AdjustCursor),
            Response::Cursor { x: 1, y: 2 }
        );
    }
}
