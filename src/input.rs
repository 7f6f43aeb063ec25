//! Console Input Decoder
//!
//! Turns raw console key codes into a single normalized key code.
//! Function and arrow keys arrive as two codes: a prefix (0x00 or 0xE0)
//! followed by the key identity. The decoder always consumes both before
//! returning, then translates the final code through the keyboard layout.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::platform::Console;

/// Prefix of a function-key sequence
pub const FUNCTION_PREFIX: i32 = 0x00;
/// Prefix of an arrow/navigation-key sequence
pub const ARROW_PREFIX: i32 = 0xE0;

/// The most recently decoded key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Raw code of the key pressed, before translation.
    ///
    /// For an extended key this is the second code of the pair (72 for Up),
    /// not the 0x00/0xE0 prefix read first. conio-style loops that keep the
    /// first byte of every read would see the prefix here; use `is_extended`
    /// to tell the two apart instead.
    pub raw_code: i32,
    /// Whether the key arrived as a two-code sequence
    pub is_extended: bool,
}

/// First step of a decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyRead {
    /// A complete single-code key
    Plain(i32),
    /// A prefix; the key identity follows
    Prefix(i32),
}

impl KeyRead {
    fn classify(code: i32) -> Self {
        if code == FUNCTION_PREFIX || code == ARROW_PREFIX {
            KeyRead::Prefix(code)
        } else {
            KeyRead::Plain(code)
        }
    }
}

/// Extended-key decoder state
#[derive(Debug, Clone, Default)]
pub struct InputDecoder {
    last: InputEvent,
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return to the neutral state
    pub fn reset(&mut self) {
        self.last = InputEvent::default();
    }

    pub fn last_event(&self) -> InputEvent {
        self.last
    }

    pub fn last_raw_key(&self) -> i32 {
        self.last.raw_code
    }

    pub fn is_extended_key(&self) -> bool {
        self.last.is_extended
    }

    /// Read and decode one key.
    ///
    /// Returns 0 when `blocking` is false and nothing is pending. The second
    /// code of an extended sequence is always read blocking.
    pub fn poll<C: Console>(&mut self, console: &mut C, blocking: bool) -> i32 {
        debug!("Polling console input (blocking: {})", blocking);

        if !blocking {
            match console.key_available() {
                Ok(true) => {}
                Ok(false) => return 0,
                Err(e) => {
                    warn!("Key availability check failed: {}", e);
                    return 0;
                }
            }
        }

        let first = match console.read_key() {
            Ok(code) => code,
            Err(e) => {
                warn!("Key read failed: {}", e);
                return 0;
            }
        };

        let event = match KeyRead::classify(first) {
            KeyRead::Plain(code) => InputEvent {
                raw_code: code,
                is_extended: false,
            },
            KeyRead::Prefix(prefix) => {
                debug!("Function/arrow prefix: {}", prefix);
                self.last = InputEvent {
                    raw_code: prefix,
                    is_extended: true,
                };
                match console.read_key() {
                    Ok(code) => InputEvent {
                        raw_code: code,
                        is_extended: true,
                    },
                    Err(e) => {
                        warn!("Extended key read failed: {}", e);
                        return 0;
                    }
                }
            }
        };
        self.last = event;

        let result = if event.raw_code > 0 {
            i32::from(console.scan_translate(event.raw_code) as u8)
        } else {
            event.raw_code
        };

        debug!(
            "Keypress: {}, raw: {}, extended: {}",
            result,
            event.raw_code,
            if event.is_extended { "yes" } else { "no" }
        );
        result
    }
}

/// Encode a terminal key event as conio key codes
pub fn encode_key(key: &KeyEvent) -> Vec<u8> {
    let arrow = |code: u8| vec![ARROW_PREFIX as u8, code];

    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() => {
            vec![c.to_ascii_lowercase() as u8 - b'a' + 1]
        }
        KeyCode::Char(c) if c.is_ascii() => vec![c as u8],
        KeyCode::Char(_) => Vec::new(),
        KeyCode::Enter => vec![0x0D],
        KeyCode::Tab => vec![0x09],
        KeyCode::BackTab => vec![FUNCTION_PREFIX as u8, 15],
        KeyCode::Backspace => vec![0x08],
        KeyCode::Esc => vec![0x1B],
        KeyCode::Home => arrow(71),
        KeyCode::Up => arrow(72),
        KeyCode::PageUp => arrow(73),
        KeyCode::Left => arrow(75),
        KeyCode::Right => arrow(77),
        KeyCode::End => arrow(79),
        KeyCode::Down => arrow(80),
        KeyCode::PageDown => arrow(81),
        KeyCode::Insert => arrow(82),
        KeyCode::Delete => arrow(83),
        KeyCode::F(n @ 1..=10) => vec![FUNCTION_PREFIX as u8, 58 + n],
        KeyCode::F(11) => arrow(133),
        KeyCode::F(12) => arrow(134),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryConsole;

    fn console_with(keys: &[i32]) -> MemoryConsole {
        let mut console = MemoryConsole::new(80, 25);
        console.push_keys(keys);
        console
    }

    #[test]
    fn test_plain_key_single_read() {
        let mut console = console_with(&[b'a' as i32]);
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.poll(&mut console, true), 0x41);
        assert_eq!(console.ledger().key_reads, 1);
        assert!(!decoder.is_extended_key());
        assert_eq!(decoder.last_raw_key(), b'a' as i32);
    }

    #[test]
    fn test_arrow_prefix_consumes_second_code() {
        let mut console = console_with(&[0xE0, 72, b'x' as i32]);
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.poll(&mut console, true), 72);
        assert_eq!(console.ledger().key_reads, 2);
        assert!(decoder.is_extended_key());
        assert_eq!(decoder.last_raw_key(), 72);
        assert_eq!(console.pending_keys(), 1);
    }

    #[test]
    fn test_function_prefix_consumes_second_code() {
        // F1
        let mut console = console_with(&[0x00, 59]);
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.poll(&mut console, true), 0xBA);
        assert_eq!(console.ledger().key_reads, 2);
        assert!(decoder.is_extended_key());
    }

    #[test]
    fn test_second_read_blocks_even_when_polling() {
        let mut console = console_with(&[0xE0, 80]);
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.poll(&mut console, false), 80);
        assert_eq!(console.pending_keys(), 0);
    }

    #[test]
    fn test_non_blocking_without_input() {
        let mut console = console_with(&[]);
        let mut decoder = InputDecoder::new();
        let mut primed = console_with(&[0xE0, 72]);
        decoder.poll(&mut primed, true);

        assert_eq!(decoder.poll(&mut console, false), 0);
        assert_eq!(console.ledger().key_reads, 0);
        // State untouched
        assert!(decoder.is_extended_key());
        assert_eq!(decoder.last_raw_key(), 72);
    }

    #[test]
    fn test_unmapped_key_translates_to_low_byte() {
        let mut console = console_with(&[0x7F]);
        let mut decoder = InputDecoder::new();
        assert_eq!(decoder.poll(&mut console, true), 0xFF);
    }

    #[test]
    fn test_non_positive_code_passes_through() {
        let mut console = console_with(&[0x00, 0x00]);
        let mut decoder = InputDecoder::new();
        assert_eq!(decoder.poll(&mut console, true), 0);
        assert!(decoder.is_extended_key());
        assert_eq!(console.ledger().key_reads, 2);

        let mut console = console_with(&[-3]);
        assert_eq!(decoder.poll(&mut console, true), -3);
        assert!(!decoder.is_extended_key());
    }

    #[test]
    fn test_reset() {
        let mut console = console_with(&[0xE0, 75]);
        let mut decoder = InputDecoder::new();
        decoder.poll(&mut console, true);
        decoder.reset();
        assert_eq!(decoder.last_event(), InputEvent::default());
    }

    #[test]
    fn test_read_failure_returns_zero() {
        let mut console = console_with(&[]);
        let mut decoder = InputDecoder::new();
        assert_eq!(decoder.poll(&mut console, true), 0);
    }

    #[test]
    fn test_encode_keys() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert_eq!(encode_key(&key(KeyCode::Char('q'))), vec![b'q']);
        assert_eq!(encode_key(&key(KeyCode::Up)), vec![0xE0, 72]);
        assert_eq!(encode_key(&key(KeyCode::Delete)), vec![0xE0, 83]);
        assert_eq!(encode_key(&key(KeyCode::F(1))), vec![0x00, 59]);
        assert_eq!(encode_key(&key(KeyCode::F(10))), vec![0x00, 68]);
        assert_eq!(encode_key(&key(KeyCode::F(12))), vec![0xE0, 134]);
        assert_eq!(encode_key(&key(KeyCode::Enter)), vec![0x0D]);
        assert_eq!(encode_key(&key(KeyCode::Char('é'))), Vec::<u8>::new());

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(encode_key(&ctrl_c), vec![0x03]);
    }
}
