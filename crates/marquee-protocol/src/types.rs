//! Common types used throughout the protocol.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::*;
use crate::error::ProtocolError;

// ============================================================================
// Hardware models
// ============================================================================

/// The hardware families the protocol knows how to talk to.
///
/// The model gates which command verbs are legal and how many bitmap
/// color planes the device carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HardwareModel {
    /// First-generation busylight (7 discrete LEDs, no matrix, no test verb).
    Busylight1,
    /// Second-generation busylight (7 discrete LEDs, no matrix).
    Busylight2,
    /// 64x8 readerboard with RGB+flash matrix.
    Readerboard3Rgb,
    /// 64x8 readerboard with monochrome+flash matrix.
    Readerboard3Mono,
    /// Model not recognized from configuration.
    Unknown,
}

impl HardwareModel {
    /// Canonical name, as written back to configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            HardwareModel::Busylight1 => "Busylight1",
            HardwareModel::Busylight2 => "Busylight2",
            HardwareModel::Readerboard3Rgb => "Readerboard3_RGB",
            HardwareModel::Readerboard3Mono => "Readerboard3_Monochrome",
            HardwareModel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HardwareModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HardwareModel {
    type Err = ProtocolError;

    /// Parse a model name from configuration.
    ///
    /// Accepts the canonical names plus the historical aliases used in
    /// deployed config files: a trailing `.minor` revision is ignored
    /// ("Busylight2.1"), bare "Busylight" means the current busylight,
    /// and bare "Readerboard"/"Readerboard3" means the RGB readerboard.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let base = s.split('.').next().unwrap_or("");
        match base.to_ascii_lowercase().as_str() {
            "busylight1" => Ok(HardwareModel::Busylight1),
            "busylight" | "busylight2" => Ok(HardwareModel::Busylight2),
            "rb" | "readerboard" | "readerboard3" | "readerboard3rgb" | "readerboard3_rgb" => {
                Ok(HardwareModel::Readerboard3Rgb)
            }
            "mono" | "readerboard3mono" | "readerboard3_monochrome" | "readerboard3_mono" => {
                Ok(HardwareModel::Readerboard3Mono)
            }
            _ => Err(ProtocolError::FieldOutOfRange {
                field: "hardware model",
                value: 0,
            }),
        }
    }
}

impl Serialize for HardwareModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for HardwareModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| D::Error::custom(format!("unrecognized hardware model {s:?}")))
    }
}

/// The model class code a device reports in its query reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelClass {
    /// Busylight: discrete LEDs only, no matrix planes in the reply.
    Busylight,
    /// RGB matrix: four bitmap planes follow the dimmer block.
    MatrixRgb,
    /// Monochrome matrix: two bitmap planes follow the dimmer block.
    MatrixMono,
    /// Class code we do not recognize.
    Unknown,
}

impl ModelClass {
    /// Decode the class byte from a query reply.
    pub fn from_code(code: u8) -> ModelClass {
        match code {
            b'B' => ModelClass::Busylight,
            b'C' => ModelClass::MatrixRgb,
            b'M' => ModelClass::MatrixMono,
            _ => ModelClass::Unknown,
        }
    }

    /// The class byte a device of this class reports.
    pub fn code(&self) -> u8 {
        match self {
            ModelClass::Busylight => b'B',
            ModelClass::MatrixRgb => b'C',
            ModelClass::MatrixMono => b'M',
            ModelClass::Unknown => b'?',
        }
    }
}

// ============================================================================
// int6 codes and addresses
// ============================================================================

/// Encode an integer 0-63 as a printable int6 character.
///
/// Out-of-range values encode to `'.'`, the firmware convention for
/// "unspecified / leave as-is".
pub fn encode_int6(n: i32) -> u8 {
    if !(0..=63).contains(&n) {
        return INT6_UNSPECIFIED;
    }
    n as u8 + INT6_MIN
}

/// Decode an int6 character. `Ok(None)` means "unspecified" (`'.'`).
pub fn decode_int6(code: u8) -> Result<Option<u8>, ProtocolError> {
    if code == INT6_UNSPECIFIED {
        return Ok(None);
    }
    if !(INT6_MIN..=INT6_MAX).contains(&code) {
        return Err(ProtocolError::InvalidInt6Code(code));
    }
    Ok(Some(code - INT6_MIN))
}

/// Decode a device address byte from a reply. Anything outside the int6
/// band means the device has RS-485 addressing disabled.
pub fn parse_address(code: u8) -> u8 {
    if !(INT6_MIN..=INT6_MAX).contains(&code) {
        return ADDRESS_DISABLED;
    }
    code - INT6_MIN
}

// ============================================================================
// Baud rates
// ============================================================================

/// The 13 baud rates the firmware supports, paired with their code bytes.
pub const BAUD_RATE_CODES: [(u32, u8); 13] = [
    (300, b'0'),
    (600, b'1'),
    (1200, b'2'),
    (2400, b'3'),
    (4800, b'4'),
    (9600, b'5'),
    (14400, b'6'),
    (19200, b'7'),
    (28800, b'8'),
    (31250, b'9'),
    (38400, b'A'),
    (57600, b'B'),
    (115200, b'C'),
];

/// Encode a baud rate as its single-byte wire code.
pub fn encode_baud_rate(speed: u32) -> Result<u8, ProtocolError> {
    BAUD_RATE_CODES
        .iter()
        .find(|(rate, _)| *rate == speed)
        .map(|(_, code)| *code)
        .ok_or(ProtocolError::InvalidBaudRate(speed))
}

/// Decode a single-byte baud rate code.
pub fn decode_baud_rate(code: u8) -> Result<u32, ProtocolError> {
    BAUD_RATE_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(rate, _)| *rate)
        .ok_or(ProtocolError::InvalidBaudRateCode(code as char))
}

// ============================================================================
// Colors, transitions, alignments
// ============================================================================

/// Drawing colors, including the flashing variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Off,
    Red,
    Green,
    Amber,
    Blue,
    Magenta,
    Cyan,
    White,
    FlashingOff,
    FlashingRed,
    FlashingGreen,
    FlashingAmber,
    FlashingBlue,
    FlashingMagenta,
    FlashingCyan,
    FlashingWhite,
}

/// (color, wire code, accepted spellings). Numeric codes 0-15 and the
/// literal code character are accepted implicitly.
const COLOR_TABLE: [(Color, u8, &[&str]); 16] = [
    (Color::Off, b'0', &["off", "black", "bk", "k"]),
    (Color::Red, b'1', &["red", "r"]),
    (Color::Green, b'2', &["green", "g"]),
    (Color::Amber, b'3', &["amber", "yellow", "a", "y"]),
    (Color::Blue, b'4', &["blue", "bl", "b"]),
    (Color::Magenta, b'5', &["magenta", "m"]),
    (Color::Cyan, b'6', &["cyan", "c"]),
    (Color::White, b'7', &["white", "w"]),
    (
        Color::FlashingOff,
        b'8',
        &["flashing-off", "flashing-black", "fbk", "fk"],
    ),
    (Color::FlashingRed, b'9', &["flashing-red", "fr"]),
    (Color::FlashingGreen, b':', &["flashing-green", "fg"]),
    (
        Color::FlashingAmber,
        b';',
        &["flashing-amber", "flashing-yellow", "fa", "fy"],
    ),
    (Color::FlashingBlue, b'<', &["flashing-blue", "fb", "fbl"]),
    (Color::FlashingMagenta, b'=', &["flashing-magenta", "fm"]),
    (Color::FlashingCyan, b'>', &["flashing-cyan", "fc"]),
    (Color::FlashingWhite, b'?', &["flashing-white", "fw"]),
];

impl Color {
    /// The single-byte wire code for this color.
    pub fn code(&self) -> u8 {
        COLOR_TABLE
            .iter()
            .find(|(c, _, _)| c == self)
            .map(|(_, code, _)| *code)
            .unwrap_or(b'1')
    }

    /// Look up a color by its wire code byte.
    pub fn from_code(code: u8) -> Option<Color> {
        COLOR_TABLE
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(color, _, _)| *color)
    }

    /// Parse a color parameter: a numeric code 0-15, a symbolic name, or
    /// a literal code character. Unrecognized input defaults to red;
    /// color words are never a hard error.
    pub fn parse(s: &str) -> Color {
        if let Ok(n) = s.parse::<u8>() {
            if n < 16 {
                return COLOR_TABLE[n as usize].0;
            }
        }
        if s.len() == 1 {
            if let Some(color) = Color::from_code(s.as_bytes()[0]) {
                return color;
            }
        }
        let lower = s.to_ascii_lowercase();
        for (color, _, names) in COLOR_TABLE.iter() {
            if names.contains(&lower.as_str()) {
                return *color;
            }
        }
        Color::Red
    }
}

/// Transition effects for text and bitmap display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    #[default]
    None,
    ScrollRight,
    ScrollLeft,
    ScrollUp,
    ScrollDown,
    WipeLeft,
    WipeRight,
    WipeUp,
    WipeDown,
    WipeHorizontal,
    WipeVertical,
}

const TRANSITION_TABLE: [(Transition, u8, &[&str]); 11] = [
    (Transition::None, b'.', &["", "none", "_", "."]),
    (Transition::ScrollRight, b'>', &[">", "scroll-right", "sr"]),
    (Transition::ScrollLeft, b'<', &["<", "scroll-left", "sl"]),
    (Transition::ScrollUp, b'^', &["^", "scroll-up", "su"]),
    (Transition::ScrollDown, b'v', &["v", "scroll-down", "sd"]),
    (Transition::WipeLeft, b'L', &["l", "wipe-left", "wl"]),
    (Transition::WipeRight, b'R', &["r", "wipe-right", "wr"]),
    (Transition::WipeUp, b'U', &["u", "wipe-up", "wu"]),
    (Transition::WipeDown, b'D', &["d", "wipe-down", "wd"]),
    (Transition::WipeHorizontal, b'|', &["|", "wipe-horiz", "wh"]),
    (Transition::WipeVertical, b'-', &["-", "wipe-vert", "wv"]),
];

impl Transition {
    /// The single-byte wire code for this transition.
    pub fn code(&self) -> u8 {
        TRANSITION_TABLE
            .iter()
            .find(|(t, _, _)| t == self)
            .map(|(_, code, _)| *code)
            .unwrap_or(b'.')
    }

    /// Parse a transition parameter. Unrecognized input means "none".
    pub fn parse(s: &str) -> Transition {
        let lower = s.to_ascii_lowercase();
        for (transition, _, names) in TRANSITION_TABLE.iter() {
            if names.contains(&lower.as_str()) {
                return *transition;
            }
        }
        Transition::None
    }
}

/// Text alignment on the display matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Right,
    Center,
    LocalRight,
    LocalCenterLeft,
    LocalCenterRight,
}

const ALIGNMENT_TABLE: [(Alignment, u8, &[&str]); 7] = [
    (Alignment::None, b'.', &["", ".", "none", "_"]),
    (Alignment::Left, b'<', &["<", "left"]),
    (Alignment::Right, b'>', &[">", "right"]),
    (Alignment::Center, b'^', &["^", "center"]),
    (Alignment::LocalRight, b'R', &["r", "local-right", "lr"]),
    (
        Alignment::LocalCenterLeft,
        b'L',
        &["l", "local-center-left", "lcl", "cl"],
    ),
    (
        Alignment::LocalCenterRight,
        b'C',
        &["c", "local-center-right", "lcr", "cr"],
    ),
];

impl Alignment {
    /// The single-byte wire code for this alignment.
    pub fn code(&self) -> u8 {
        ALIGNMENT_TABLE
            .iter()
            .find(|(a, _, _)| a == self)
            .map(|(_, code, _)| *code)
            .unwrap_or(b'.')
    }

    /// Parse an alignment parameter. Unrecognized input means "none".
    pub fn parse(s: &str) -> Alignment {
        let lower = s.to_ascii_lowercase();
        for (alignment, _, names) in ALIGNMENT_TABLE.iter() {
            if names.contains(&lower.as_str()) {
                return *alignment;
            }
        }
        Alignment::None
    }
}

// ============================================================================
// Positions
// ============================================================================

/// A matrix column position: one character in the printable column band,
/// or `'~'` for "unspecified".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position(u8);

impl Position {
    /// The "unspecified column" position.
    pub const UNSPECIFIED: Position = Position(POSITION_UNSPECIFIED);

    /// Build a position from a matrix column number.
    pub fn column(col: u8) -> Result<Position, ProtocolError> {
        if usize::from(col) >= MATRIX_COLUMNS {
            return Err(ProtocolError::BadPosition(format!("column {col}")));
        }
        Ok(Position(col + INT6_MIN))
    }

    /// Parse a position parameter: exactly one character in `['0','o']`
    /// or the literal `'~'`.
    pub fn parse(s: &str) -> Result<Position, ProtocolError> {
        let bytes = s.as_bytes();
        if bytes.len() != 1 {
            return Err(ProtocolError::BadPosition(s.to_string()));
        }
        let b = bytes[0];
        if b == POSITION_UNSPECIFIED || (INT6_MIN..=INT6_MAX).contains(&b) {
            Ok(Position(b))
        } else {
            Err(ProtocolError::BadPosition(s.to_string()))
        }
    }

    /// The wire byte for this position.
    pub fn code(&self) -> u8 {
        self.0
    }
}

// ============================================================================
// Capability flags from query replies
// ============================================================================

/// EEPROM support reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EepromKind {
    /// No persistent settings storage.
    None,
    /// MCU-internal EEPROM.
    Internal,
    /// External EEPROM chip.
    External,
}

impl EepromKind {
    /// Decode the EEPROM code byte from a query reply.
    pub fn from_code(code: u8) -> Result<EepromKind, ProtocolError> {
        match code {
            b'_' => Ok(EepromKind::None),
            b'I' => Ok(EepromKind::Internal),
            b'X' => Ok(EepromKind::External),
            _ => Err(ProtocolError::FieldOutOfRange {
                field: "EEPROM type",
                value: code,
            }),
        }
    }

    /// The code byte a device with this EEPROM support reports.
    pub fn code(&self) -> u8 {
        match self {
            EepromKind::None => b'_',
            EepromKind::Internal => b'I',
            EepromKind::External => b'X',
        }
    }
}

/// Sound hardware reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundSupport {
    /// No speaker installed.
    None,
    /// Speaker, tones only.
    Speaker,
    /// Speaker with timer-driven playback.
    SpeakerTimer,
}

impl SoundSupport {
    /// Decode the sound support code byte from a query reply.
    pub fn from_code(code: u8) -> Result<SoundSupport, ProtocolError> {
        match code {
            b'_' => Ok(SoundSupport::None),
            b'S' => Ok(SoundSupport::Speaker),
            b'T' => Ok(SoundSupport::SpeakerTimer),
            _ => Err(ProtocolError::FieldOutOfRange {
                field: "sound support type",
                value: code,
            }),
        }
    }

    /// The code byte a device with this sound support reports.
    pub fn code(&self) -> u8 {
        match self {
            SoundSupport::None => b'_',
            SoundSupport::Speaker => b'S',
            SoundSupport::SpeakerTimer => b'T',
        }
    }
}

// ============================================================================
// Discrete LED state
// ============================================================================

/// Custom flasher/strober timing, in seconds (device resolution is
/// tenths of a second, 0.0-6.3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceTiming {
    pub up: f32,
    pub on: f32,
    pub down: f32,
    pub off: f32,
}

impl SequenceTiming {
    /// True when every phase is zero, meaning firmware defaults apply.
    pub fn is_default(&self) -> bool {
        self.up == 0.0 && self.on == 0.0 && self.down == 0.0 && self.off == 0.0
    }
}

/// A flasher or strober sequence over a subset of the discrete LEDs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedSequence {
    /// Whether the sequence is currently running.
    pub is_running: bool,
    /// Custom timing, if the firmware defaults are overridden.
    pub timing: Option<SequenceTiming>,
    /// Current position within the sequence, when one is active.
    pub position: Option<u8>,
    /// The LED codes in the sequence.
    pub sequence: Vec<u8>,
}

impl LedSequence {
    /// Stop the sequence and forget its LED list.
    pub fn clear(&mut self) {
        *self = LedSequence::default();
    }

    /// Start a sequence over the given LEDs.
    pub fn set(&mut self, leds: &[u8], timing: Option<SequenceTiming>) {
        self.is_running = !leds.is_empty();
        self.timing = timing.filter(|t| !t.is_default());
        self.position = None;
        self.sequence = leds.to_vec();
    }
}

/// Current state of a device's discrete (non-matrix) LEDs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscreteLedStatus {
    /// One status character per installed LED, `'_'` when off.
    pub status_lights: String,
    /// Flasher behavior.
    pub flasher: LedSequence,
    /// Strober behavior.
    pub strober: LedSequence,
}

impl DiscreteLedStatus {
    /// The all-off state for a device with the given installed LEDs.
    pub fn all_off(installed: &str) -> DiscreteLedStatus {
        DiscreteLedStatus {
            status_lights: str::repeat("_", installed.len()),
            ..DiscreteLedStatus::default()
        }
    }

    /// Extinguish every installed LED and stop both sequences.
    pub fn clear(&mut self, installed: &str) {
        *self = DiscreteLedStatus::all_off(installed);
    }

    /// Record that exactly the listed LEDs are lit.
    pub fn set_lights(&mut self, lit: &[u8], installed: &str) {
        self.status_lights = installed
            .bytes()
            .map(|led| if lit.contains(&led) { led as char } else { '_' })
            .collect();
    }
}

// ============================================================================
// Full device status
// ============================================================================

/// A fully decoded device query reply.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatus {
    /// Hardware class the device reports.
    pub model_class: ModelClass,
    /// RS-485 device address, or [`ADDRESS_DISABLED`] when RS-485 is off.
    pub address: u8,
    /// Global (broadcast) address the device listens to.
    pub global_address: u8,
    /// USB link baud rate.
    pub usb_speed: u32,
    /// RS-485 link baud rate.
    pub rs485_speed: u32,
    /// EEPROM support.
    pub eeprom: EepromKind,
    /// Sound hardware support.
    pub sound: SoundSupport,
    /// Hardware revision string.
    pub hardware_revision: String,
    /// Firmware revision string.
    pub firmware_revision: String,
    /// Device serial number.
    pub serial: String,
    /// Discrete LED state.
    pub leds: DiscreteLedStatus,
    /// Per-plane dimmer values; `None` means "unset".
    pub dimmers: Vec<Option<u8>>,
    /// Matrix contents, for readerboard classes.
    pub bitmap: Option<crate::image::ImageBitmap>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int6_injective_in_range() {
        let mut seen = std::collections::HashSet::new();
        for n in 0..=63 {
            let code = encode_int6(n);
            assert!(seen.insert(code), "duplicate code for {n}");
            assert_eq!(decode_int6(code).unwrap(), Some(n as u8));
        }
    }

    #[test]
    fn int6_out_of_range_is_unspecified() {
        for n in [-1000, -1, 64, 100, i32::MAX] {
            assert_eq!(encode_int6(n), b'.');
        }
        // '.' decodes to "unspecified", never to zero
        assert_eq!(decode_int6(b'.').unwrap(), None);
        assert!(decode_int6(b'p').is_err());
    }

    #[test]
    fn baud_rate_table_round_trips() {
        for (rate, code) in BAUD_RATE_CODES {
            assert_eq!(encode_baud_rate(rate).unwrap(), code);
            assert_eq!(decode_baud_rate(code).unwrap(), rate);
        }
        assert!(encode_baud_rate(110).is_err());
        assert!(decode_baud_rate(b'D').is_err());
    }

    #[test]
    fn color_parse_is_lenient() {
        assert_eq!(Color::parse("red"), Color::Red);
        assert_eq!(Color::parse("11"), Color::FlashingAmber);
        assert_eq!(Color::parse(";"), Color::FlashingAmber);
        assert_eq!(Color::parse("flashing-blue"), Color::FlashingBlue);
        // never a hard error
        assert_eq!(Color::parse("chartreuse"), Color::Red);
        assert_eq!(Color::parse(""), Color::Red);
    }

    #[test]
    fn transition_and_alignment_default_to_none() {
        assert_eq!(Transition::parse("scroll-left"), Transition::ScrollLeft);
        assert_eq!(Transition::parse("wiggle"), Transition::None);
        assert_eq!(Transition::parse("").code(), b'.');
        assert_eq!(Alignment::parse("center"), Alignment::Center);
        assert_eq!(Alignment::parse("justified"), Alignment::None);
    }

    #[test]
    fn position_parse() {
        assert_eq!(Position::parse("~").unwrap(), Position::UNSPECIFIED);
        assert_eq!(Position::parse("0").unwrap().code(), b'0');
        assert!(Position::parse("").is_err());
        assert!(Position::parse("00").is_err());
        assert!(Position::parse("p").is_err());
        assert_eq!(Position::column(15).unwrap().code(), b'?');
    }

    #[test]
    fn position_column_band_is_the_matrix_width() {
        assert_eq!(Position::column(63).unwrap().code(), b'o');
        assert!(Position::column(64).is_err());
    }

    #[test]
    fn model_aliases_parse() {
        assert_eq!(
            "Busylight1.x".parse::<HardwareModel>().unwrap(),
            HardwareModel::Busylight1
        );
        assert_eq!(
            "Busylight2.1".parse::<HardwareModel>().unwrap(),
            HardwareModel::Busylight2
        );
        assert_eq!(
            "Busylight".parse::<HardwareModel>().unwrap(),
            HardwareModel::Busylight2
        );
        assert_eq!(
            "Readerboard3".parse::<HardwareModel>().unwrap(),
            HardwareModel::Readerboard3Rgb
        );
        assert_eq!(
            "Readerboard3_Monochrome".parse::<HardwareModel>().unwrap(),
            HardwareModel::Readerboard3Mono
        );
        assert!("Rboard".parse::<HardwareModel>().is_err());
    }

    #[test]
    fn status_set_lights_tracks_installed_order() {
        let mut status = DiscreteLedStatus::all_off("GyYrRBW");
        status.set_lights(b"RG", "GyYrRBW");
        assert_eq!(status.status_lights, "G___R__");
        status.clear("GyYrRBW");
        assert_eq!(status.status_lights, "_______");
    }
}
