//! Protocol constants.
//!
//! Command verb bytes and framing constants for the readerboard/busylight
//! serial command set. Values match the device firmware.

/// Command verb: display a text message on the matrix.
pub const CMD_TEXT: u8 = b'T';
/// Command verb: scroll a text message across the matrix.
pub const CMD_SCROLL: u8 = b'<';
/// Command verb: display a bitmap image.
pub const CMD_BITMAP: u8 = b'I';
/// Command verb: set a static pattern on the discrete LEDs.
pub const CMD_LIGHT: u8 = b'L';
/// Command verb: light exactly one discrete LED (short form of Light).
pub const CMD_LIGHT_SINGLE: u8 = b'S';
/// Command verb: set a flash pattern on the discrete LEDs.
pub const CMD_FLASH: u8 = b'F';
/// Command verb: set a strobe pattern on the discrete LEDs.
pub const CMD_STROBE: u8 = b'*';
/// Command verb: plot a histogram data point.
pub const CMD_GRAPH: u8 = b'H';
/// Command verb: set the current drawing color.
pub const CMD_COLOR: u8 = b'K';
/// Command verb: reposition the text cursor.
pub const CMD_MOVE: u8 = b'@';
/// Command verb: select an indexed font.
pub const CMD_FONT: u8 = b'A';
/// Command verb: set a dimmer value.
pub const CMD_DIM: u8 = b'D';
/// Command verb: play a sound on the speaker.
pub const CMD_SOUND: u8 = b'B';
/// Command verb: send a message in Morse code on one LED.
pub const CMD_MORSE: u8 = b'M';
/// Command verb: device configuration block (also Save / DiagBanners).
pub const CMD_CONFIGURE: u8 = b'=';
/// Command verb: query full device status.
pub const CMD_QUERY: u8 = b'Q';
/// Command verb: query discrete LED status only.
pub const CMD_QUERY_STATUS: u8 = b'?';
/// Command verb: clear the display matrix.
pub const CMD_CLEAR: u8 = b'C';
/// Command verb: turn off the discrete LEDs.
pub const CMD_OFF: u8 = b'X';
/// Command verb: run the power-on test pattern.
pub const CMD_TEST: u8 = b'%';

/// Terminates variable-length list fields (LED lists, hex planes).
pub const FIELD_TERMINATOR: u8 = b'$';

/// Terminates raw 8-bit text payloads. Never legal inside a payload.
pub const TEXT_TERMINATOR: u8 = 0x1b;

/// Separates/terminates whole commands on USB-direct links. Never legal
/// inside a text payload.
pub const USB_COMMAND_TERMINATOR: u8 = 0x04;

/// RS-485 escape introducing a byte whose MSB was cleared.
pub const ESC_485_MSB: u8 = 0x7e;
/// RS-485 escape introducing a literal 0x7e or 0x7f byte.
pub const ESC_485_LITERAL: u8 = 0x7f;

/// First byte of the int6 printable encoding band.
pub const INT6_MIN: u8 = b'0';
/// Last byte of the int6 printable encoding band.
pub const INT6_MAX: u8 = b'o';
/// Int6 code meaning "unspecified / leave as-is".
pub const INT6_UNSPECIFIED: u8 = b'.';

/// Highest valid individual device address.
pub const MAX_DEVICE_ADDRESS: u8 = 63;
/// Address value reported when RS-485 is disabled on a device.
pub const ADDRESS_DISABLED: u8 = 0xff;
/// Default global (broadcast) address.
pub const DEFAULT_GLOBAL_ADDRESS: u8 = 15;

/// Display matrix geometry shared by all readerboard models.
pub const MATRIX_COLUMNS: usize = 64;
/// Number of pixel rows in a matrix column byte.
pub const MATRIX_ROWS: usize = 8;

/// Idle (off) status character for a discrete LED.
pub const LED_IDLE: u8 = b'_';

/// Position byte meaning "unspecified column".
pub const POSITION_UNSPECIFIED: u8 = b'~';
