//! RS-485 7-bit-safe byte escaping.
//!
//! The multidrop protocol reserves the MSB to mark the start of a new
//! command frame, so payload bytes must never have it set. Any byte with
//! the MSB set is sent as 0x7E followed by the byte with the MSB
//! cleared; the escape bytes 0x7E and 0x7F themselves are sent as 0x7F
//! followed by the original byte.

use crate::constants::{ESC_485_LITERAL, ESC_485_MSB};
use crate::error::ProtocolError;

/// Escape an arbitrary 8-bit byte sequence for transmission on an
/// RS-485 network.
pub fn escape_485(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    for &b in input {
        if b == ESC_485_MSB || b == ESC_485_LITERAL {
            out.push(ESC_485_LITERAL);
            out.push(b);
        } else if b & 0x80 != 0 {
            out.push(ESC_485_MSB);
            out.push(b & 0x7f);
        } else {
            out.push(b);
        }
    }
    out
}

/// Reverse [`escape_485`], restoring the original 8-bit data stream.
///
/// An escape byte with no byte following it is a malformed stream.
pub fn unescape_485(input: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let mut out = Vec::with_capacity(input.len());
    let mut iter = input.iter();
    while let Some(&b) = iter.next() {
        match b {
            ESC_485_LITERAL => {
                let &next = iter.next().ok_or(ProtocolError::TruncatedEscape)?;
                out.push(next);
            }
            ESC_485_MSB => {
                let &next = iter.next().ok_or(ProtocolError::TruncatedEscape)?;
                out.push(next | 0x80);
            }
            _ => out.push(b),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_bytes_pass_through() {
        let data = b"Hello $ world";
        assert_eq!(escape_485(data), data);
        assert_eq!(unescape_485(data).unwrap(), data);
    }

    #[test]
    fn high_bit_bytes_are_split() {
        assert_eq!(escape_485(&[0x80]), vec![0x7e, 0x00]);
        assert_eq!(escape_485(&[0xff]), vec![0x7e, 0x7f]);
    }

    #[test]
    fn escape_bytes_are_literalized() {
        assert_eq!(escape_485(&[0x7e]), vec![0x7f, 0x7e]);
        assert_eq!(escape_485(&[0x7f]), vec![0x7f, 0x7f]);
    }

    #[test]
    fn round_trip_all_byte_values() {
        let all: Vec<u8> = (0..=255).collect();
        assert_eq!(unescape_485(&escape_485(&all)).unwrap(), all);
    }

    #[test]
    fn round_trip_mixed_stream() {
        let data = vec![0x00, 0x7e, 0x41, 0x7f, 0x80, 0xfe, 0x7d, 0xff];
        assert_eq!(unescape_485(&escape_485(&data)).unwrap(), data);
    }

    #[test]
    fn dangling_escape_is_an_error() {
        assert_eq!(
            unescape_485(&[b'A', 0x7e]),
            Err(ProtocolError::TruncatedEscape)
        );
        assert_eq!(unescape_485(&[0x7f]), Err(ProtocolError::TruncatedEscape));
    }
}
