//! Protocol error types.

use thiserror::Error;

use crate::types::HardwareModel;

/// Errors that can occur when building command bytes or decoding replies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Command verb not supported by the target hardware model.
    #[error("{command} command not supported for hardware model {model}")]
    UnsupportedCommand {
        /// Verb name.
        command: &'static str,
        /// The model that rejected it.
        model: HardwareModel,
    },

    /// Reply is too short to contain the expected fields.
    #[error("reply too short: expected at least {expected} bytes, got {actual}")]
    ReplyTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Fixed-position header bytes do not match the expected layout.
    #[error("malformed reply header")]
    BadReplyHeader,

    /// Reply declares a format version this decoder does not understand.
    #[error("unsupported reply format version {0:?}")]
    UnsupportedFormatVersion(char),

    /// A self-terminated string field is missing its `$`/ESC terminator.
    #[error("{field} field is missing its terminator")]
    MissingTerminator {
        /// Field name.
        field: &'static str,
    },

    /// A string field does not start with its expected tag byte.
    #[error("{field} field is missing its {prefix:?} tag")]
    MissingPrefix {
        /// Field name.
        field: &'static str,
        /// Expected tag character.
        prefix: char,
    },

    /// A field byte is outside its declared code range.
    #[error("{field} value 0x{value:02X} out of range")]
    FieldOutOfRange {
        /// Field name.
        field: &'static str,
        /// Offending byte.
        value: u8,
    },

    /// A field that must hold 8-bit text contained invalid UTF-8.
    #[error("invalid UTF-8 in {field} field")]
    InvalidUtf8 {
        /// Field name.
        field: &'static str,
    },

    /// Baud rate not in the 13-entry supported table.
    #[error("invalid baud rate {0}")]
    InvalidBaudRate(u32),

    /// Baud rate code byte not in the 13-entry supported table.
    #[error("invalid baud rate code {0:?}")]
    InvalidBaudRateCode(char),

    /// Int6 code byte outside the printable band.
    #[error("int6 code 0x{0:02X} out of range ['0','o']")]
    InvalidInt6Code(u8),

    /// Text payload contains a byte the wire format reserves.
    #[error("text payload contains illegal byte 0x{0:02X}")]
    IllegalTextByte(u8),

    /// LED list entry outside printable ASCII or equal to the terminator.
    #[error("LED #{index} code 0x{code:02X} not allowed")]
    BadLedCode {
        /// Position in the list.
        index: usize,
        /// Offending code.
        code: u8,
    },

    /// A parameter that must name exactly one LED named zero or several.
    #[error("parameter must name exactly one LED")]
    NotASingleLed,

    /// Graph color list was not exactly eight entries.
    #[error("graph colors parameter requires eight color values, got {0}")]
    BadColorListLength(usize),

    /// Position parameter malformed.
    #[error("position {0:?} must be one character in ['0','o'] or '~'")]
    BadPosition(String),

    /// Font index outside the device's font table.
    #[error("font index {0} out of range [0,9]")]
    BadFontIndex(u8),

    /// Bitmap plane count does not match the model's color depth.
    #[error("bitmap has {actual} planes but model {model} requires {expected}")]
    WrongPlaneCount {
        /// Planes required by the model.
        expected: usize,
        /// Planes supplied.
        actual: usize,
        /// Target model.
        model: HardwareModel,
    },

    /// Bitmap depth is neither 2 (mono+flash) nor 4 (RGB+flash).
    #[error("bitmap depth must be 2 or 4, got {0}")]
    BadBitmapDepth(usize),

    /// Unrecognized pixel character in an ASCII bitmap source.
    #[error("invalid pixel character {pixel:?} at row {row}, column {col}")]
    BadPixelChar {
        /// Offending character.
        pixel: char,
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },

    /// Hex-encoded field contained a non-hex digit or odd digit count.
    #[error("invalid hex data in {field} field")]
    InvalidHex {
        /// Field name.
        field: &'static str,
    },

    /// A hex-encoded bitmap plane exceeded 64 bytes.
    #[error("bitmap plane longer than 64 bytes")]
    PlaneTooLong,

    /// RS-485 escaped stream ended in the middle of an escape sequence.
    #[error("RS-485 stream truncated inside an escape sequence")]
    TruncatedEscape,
}
