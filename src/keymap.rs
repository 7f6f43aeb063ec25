//! US keyboard-layout scan translation
//!
//! Maps a character code to the virtual key that produces it. The low byte
//! of the result is the virtual key, the high byte the shift state
//! (1 = Shift, 2 = Ctrl). Codes no key produces map to -1.

const SHIFT: i16 = 0x100;
const CTRL: i16 = 0x200;

/// Virtual key codes for the OEM punctuation keys, unshifted then shifted
const OEM_KEYS: [(u8, u8, i16); 11] = [
    (b';', b':', 0xBA),
    (b'=', b'+', 0xBB),
    (b',', b'<', 0xBC),
    (b'-', b'_', 0xBD),
    (b'.', b'>', 0xBE),
    (b'/', b'?', 0xBF),
    (b'`', b'~', 0xC0),
    (b'[', b'{', 0xDB),
    (b'\\', b'|', 0xDC),
    (b']', b'}', 0xDD),
    (b'\'', b'"', 0xDE),
];

/// Shifted digit row, indexed by digit
const SHIFTED_DIGITS: &[u8; 10] = b")!@#$%^&*(";

/// Translate a character code through the US layout
pub fn vk_key_scan(code: i32) -> i16 {
    let Ok(byte) = u8::try_from(code) else {
        return -1;
    };

    match byte {
        b'a'..=b'z' => (byte - b'a' + b'A') as i16,
        b'A'..=b'Z' => SHIFT | byte as i16,
        b'0'..=b'9' | b' ' => byte as i16,
        0x08 | 0x09 | 0x0D => byte as i16,
        0x1B => CTRL | 0xDB,
        0x0A => CTRL | 0x0D,
        0x01..=0x1A => CTRL | (byte - 1 + b'A') as i16,
        0x1C => CTRL | 0xDC,
        0x1D => CTRL | 0xDD,
        _ => {
            if let Some(digit) = SHIFTED_DIGITS.iter().position(|&c| c == byte) {
                return SHIFT | (b'0' + digit as u8) as i16;
            }
            OEM_KEYS
                .iter()
                .find_map(|&(plain, shifted, vk)| {
                    if byte == plain {
                        Some(vk)
                    } else if byte == shifted {
                        Some(SHIFT | vk)
                    } else {
                        None
                    }
                })
                .unwrap_or(-1)
        }
    }
}
