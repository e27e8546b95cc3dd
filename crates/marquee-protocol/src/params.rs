//! Parameter translation.
//!
//! Converts loosely-typed external parameters (strings, numbers, lists)
//! into codec-ready values, rejecting malformed input before any command
//! bytes are built. Color, transition, and alignment words are lenient
//! (see [`crate::types`]); everything here is strict.

use crate::constants::{FIELD_TERMINATOR, TEXT_TERMINATOR, USB_COMMAND_TERMINATOR};
use crate::error::ProtocolError;
use crate::types::Color;

/// A validated list of discrete LED codes.
///
/// Entries are printable ASCII 32-127 excluding `'$'`, which terminates
/// the list on the wire. The list may be empty (meaning "no LEDs").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedList(Vec<u8>);

impl LedList {
    /// Validate and build an LED list from a parameter string.
    pub fn parse(s: &str) -> Result<LedList, ProtocolError> {
        let mut leds = Vec::with_capacity(s.len());
        for (index, ch) in s.chars().enumerate() {
            let code = ch as u32;
            if !(32..=127).contains(&code) || ch == FIELD_TERMINATOR as char {
                return Err(ProtocolError::BadLedCode {
                    index,
                    code: (code & 0xff) as u8,
                });
            }
            leds.push(code as u8);
        }
        Ok(LedList(leds))
    }

    /// The LED codes, without the wire terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse a parameter that must name exactly one LED (or one of the
/// pseudo-LEDs `'*'` and `'_'` where a verb accepts them).
pub fn parse_single_led(s: &str) -> Result<u8, ProtocolError> {
    let list = LedList::parse(s)?;
    if list.len() != 1 {
        return Err(ProtocolError::NotASingleLed);
    }
    Ok(list.as_bytes()[0])
}

/// Parse an 8-entry color list for a graph bar: either 8 literal code
/// characters or a comma-separated list of 8 symbolic names. Any other
/// length is an error.
pub fn parse_color_list(s: &str) -> Result<[Color; 8], ProtocolError> {
    let mut colors = [Color::Red; 8];
    if s.contains(',') {
        let names: Vec<&str> = s.split(',').collect();
        if names.len() != 8 {
            return Err(ProtocolError::BadColorListLength(names.len()));
        }
        for (slot, name) in colors.iter_mut().zip(names) {
            *slot = Color::parse(name);
        }
    } else {
        if s.len() != 8 {
            return Err(ProtocolError::BadColorListLength(s.len()));
        }
        for (slot, code) in colors.iter_mut().zip(s.bytes()) {
            *slot = Color::from_code(code).unwrap_or(Color::Red);
        }
    }
    Ok(colors)
}

/// Convert a text parameter to the raw 8-bit payload the wire expects.
///
/// Text is a series of 8-bit character values, not UTF-8: codepoints
/// above 255 are dropped. The ESC and 0x04 control characters are
/// reserved by the framing and are rejected, never silently encoded.
pub fn parse_text(s: &str) -> Result<Vec<u8>, ProtocolError> {
    let mut text = Vec::with_capacity(s.len());
    for ch in s.chars() {
        let code = ch as u32;
        if code == TEXT_TERMINATOR as u32 || code == USB_COMMAND_TERMINATOR as u32 {
            return Err(ProtocolError::IllegalTextByte(code as u8));
        }
        if code <= 255 {
            text.push(code as u8);
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn led_list_accepts_printable_ascii() {
        let list = LedList::parse("GyR").unwrap();
        assert_eq!(list.as_bytes(), b"GyR");
        assert!(LedList::parse("").unwrap().is_empty());
    }

    #[test]
    fn led_list_rejects_terminator_and_controls() {
        assert!(matches!(
            LedList::parse("G$R"),
            Err(ProtocolError::BadLedCode { index: 1, .. })
        ));
        assert!(LedList::parse("G\x1bR").is_err());
        assert!(LedList::parse("G\u{2603}").is_err());
    }

    #[test]
    fn single_led_requires_exactly_one() {
        assert_eq!(parse_single_led("R").unwrap(), b'R');
        assert_eq!(parse_single_led("*").unwrap(), b'*');
        assert!(matches!(
            parse_single_led("RG"),
            Err(ProtocolError::NotASingleLed)
        ));
        assert!(matches!(
            parse_single_led(""),
            Err(ProtocolError::NotASingleLed)
        ));
    }

    #[test]
    fn color_list_by_names_and_codes() {
        let named = parse_color_list("red,green,blue,white,off,cyan,magenta,amber").unwrap();
        assert_eq!(named[0], Color::Red);
        assert_eq!(named[3], Color::White);
        let coded = parse_color_list("01234567").unwrap();
        assert_eq!(coded[7], Color::White);
        assert!(matches!(
            parse_color_list("red,green"),
            Err(ProtocolError::BadColorListLength(2))
        ));
        assert!(matches!(
            parse_color_list("012"),
            Err(ProtocolError::BadColorListLength(3))
        ));
    }

    #[test]
    fn text_rejects_reserved_controls() {
        assert_eq!(parse_text("HI").unwrap(), b"HI");
        assert!(matches!(
            parse_text("a\x1bb"),
            Err(ProtocolError::IllegalTextByte(0x1b))
        ));
        assert!(matches!(
            parse_text("a\x04b"),
            Err(ProtocolError::IllegalTextByte(0x04))
        ));
        // codepoints above 255 are dropped, not encoded
        assert_eq!(parse_text("A\u{263a}B").unwrap(), b"AB");
    }
}
