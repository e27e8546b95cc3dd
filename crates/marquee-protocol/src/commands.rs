//! Command builders.
//!
//! [`Command`] is the full set of operations the firmware understands.
//! [`Command::encode`] turns one into the raw payload bytes for a given
//! hardware model, rejecting verbs the model's firmware does not
//! implement. The payload carries no addressing or link framing; that is
//! applied per network when the command is transmitted.

use crate::constants::*;
use crate::error::ProtocolError;
use crate::image::ImageBitmap;
use crate::params::{parse_text, LedList};
use crate::types::{
    encode_baud_rate, encode_int6, Alignment, Color, HardwareModel, Position, SequenceTiming,
    Transition,
};

/// Data series for the histogram verb: either a single bar height or a
/// full per-row color list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphSeries {
    /// Light the bottom `n` rows of the current column, 0-8. Values
    /// above 8 are clamped.
    Value(u8),
    /// Set the colors used for the 8 rows of graph bars.
    Colors([Color; 8]),
}

/// A device command, independent of any particular target or network.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Display text on the matrix.
    Text {
        merge: bool,
        align: Alignment,
        transition: Transition,
        text: String,
    },
    /// Scroll text across the matrix, optionally looping.
    Scroll { repeat: bool, text: String },
    /// Draw a bitmap on the matrix.
    Bitmap {
        merge: bool,
        position: Position,
        transition: Transition,
        image: ImageBitmap,
    },
    /// Light exactly the listed discrete LEDs, steady.
    Light { leds: LedList },
    /// Flash a sequence of discrete LEDs, with optional custom timing.
    Flash {
        leds: LedList,
        timing: Option<SequenceTiming>,
    },
    /// Strobe a sequence of discrete LEDs.
    Strobe { leds: LedList },
    /// Plot histogram data on the matrix.
    Graph(GraphSeries),
    /// Set the current drawing color.
    Color { color: Color },
    /// Move the text cursor.
    Move { position: Position },
    /// Select a font from the firmware font table.
    Font { index: u8 },
    /// Set the dimmer level for one LED (or `'*'` for all, `'_'` for
    /// the matrix).
    Dim { led: u8, level: u8 },
    /// Play a tune on the speaker, optionally looping.
    Sound { repeat: bool, notes: String },
    /// Send a message in Morse code on one LED (or `'_'` for the
    /// matrix).
    Morse { led: u8, text: String },
    /// Reprogram the device's addresses and port speeds.
    Configure {
        address: Option<u8>,
        usb_speed: u32,
        rs485_speed: u32,
        global_address: u8,
    },
    /// Ask for the full device status report.
    Query,
    /// Ask for the discrete LED status report.
    QueryStatus,
    /// Extinguish everything: discrete LEDs, sequences, and matrix.
    AllLightsOff,
    /// Clear the display matrix.
    Clear,
    /// Turn off the discrete LEDs and stop the flasher.
    Off,
    /// Run the hardware self-test pattern.
    Test,
    /// Save current device settings to EEPROM.
    Save,
    /// Replay the power-on diagnostic banners.
    DiagBanners,
}

/// An encoded command payload, before link framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireCommand {
    /// Ordinary payload bytes, framed and sent as one command.
    Direct(Vec<u8>),
    /// The all-lights-off operation. Networks with a broadcast-off
    /// primitive use that; point-to-point links send `direct` instead,
    /// which may contain embedded command terminators.
    BroadcastOff { direct: Vec<u8> },
}

impl Command {
    /// Short verb name, used in error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Text { .. } => "text",
            Command::Scroll { .. } => "scroll",
            Command::Bitmap { .. } => "bitmap",
            Command::Light { .. } => "light",
            Command::Flash { .. } => "flash",
            Command::Strobe { .. } => "strobe",
            Command::Graph(_) => "graph",
            Command::Color { .. } => "color",
            Command::Move { .. } => "move",
            Command::Font { .. } => "font",
            Command::Dim { .. } => "dim",
            Command::Sound { .. } => "sound",
            Command::Morse { .. } => "morse",
            Command::Configure { .. } => "configure",
            Command::Query => "query",
            Command::QueryStatus => "query-status",
            Command::AllLightsOff => "all-lights-off",
            Command::Clear => "clear",
            Command::Off => "off",
            Command::Test => "test",
            Command::Save => "save",
            Command::DiagBanners => "diag-banners",
        }
    }

    /// Whether this command reads a reply from the device.
    pub fn expects_reply(&self) -> bool {
        matches!(self, Command::Query | Command::QueryStatus)
    }

    /// Encode this command as payload bytes for the given hardware
    /// model.
    pub fn encode(&self, model: HardwareModel) -> Result<WireCommand, ProtocolError> {
        match self {
            Command::Text {
                merge,
                align,
                transition,
                text,
            } => {
                self.require_readerboard(model)?;
                let mut out = vec![
                    CMD_TEXT,
                    bool_code(*merge, b'M'),
                    align.code(),
                    transition.code(),
                ];
                out.extend_from_slice(&parse_text(text)?);
                out.push(TEXT_TERMINATOR);
                Ok(WireCommand::Direct(out))
            }

            Command::Scroll { repeat, text } => {
                self.require_readerboard(model)?;
                let mut out = vec![CMD_SCROLL, bool_code(*repeat, b'L')];
                out.extend_from_slice(&parse_text(text)?);
                out.push(TEXT_TERMINATOR);
                Ok(WireCommand::Direct(out))
            }

            Command::Bitmap {
                merge,
                position,
                transition,
                image,
            } => {
                let planes = model.plane_count().ok_or(ProtocolError::UnsupportedCommand {
                    command: self.name(),
                    model,
                })?;
                if image.planes.len() != planes {
                    return Err(ProtocolError::WrongPlaneCount {
                        expected: planes,
                        actual: image.planes.len(),
                        model,
                    });
                }
                if image.width > MATRIX_COLUMNS {
                    return Err(ProtocolError::PlaneTooLong);
                }
                let mut out = vec![
                    CMD_BITMAP,
                    bool_code(*merge, b'M'),
                    position.code(),
                    transition.code(),
                ];
                for plane in &image.planes {
                    for &column in plane {
                        out.push(hex_nybble(column >> 4));
                        out.push(hex_nybble(column));
                    }
                    out.push(FIELD_TERMINATOR);
                }
                Ok(WireCommand::Direct(out))
            }

            Command::Light { leds } => {
                if leds.len() == 1 {
                    // single-LED short form, legal on every model
                    return Ok(WireCommand::Direct(vec![
                        CMD_LIGHT_SINGLE,
                        leds.as_bytes()[0],
                    ]));
                }
                self.require_readerboard(model)?;
                Ok(WireCommand::Direct(led_verb(CMD_LIGHT, leds)))
            }

            Command::Flash { leds, timing } => {
                let mut out = match (*timing).filter(|t| !t.is_default()) {
                    None => vec![CMD_FLASH],
                    Some(t) => vec![
                        CMD_FLASH,
                        b'/',
                        encode_int6((t.up * 10.0) as i32),
                        encode_int6((t.on * 10.0) as i32),
                        encode_int6((t.down * 10.0) as i32),
                        encode_int6((t.off * 10.0) as i32),
                    ],
                };
                out.extend_from_slice(leds.as_bytes());
                out.push(FIELD_TERMINATOR);
                Ok(WireCommand::Direct(out))
            }

            Command::Strobe { leds } => Ok(WireCommand::Direct(led_verb(CMD_STROBE, leds))),

            Command::Graph(series) => {
                self.require_readerboard(model)?;
                match series {
                    GraphSeries::Value(n) => Ok(WireCommand::Direct(vec![
                        CMD_GRAPH,
                        b'0' + (*n).min(8),
                    ])),
                    GraphSeries::Colors(colors) => {
                        let mut out = vec![CMD_GRAPH, b'K'];
                        out.extend(colors.iter().map(Color::code));
                        Ok(WireCommand::Direct(out))
                    }
                }
            }

            Command::Color { color } => {
                self.require_readerboard(model)?;
                Ok(WireCommand::Direct(vec![CMD_COLOR, color.code()]))
            }

            Command::Move { position } => {
                self.require_readerboard(model)?;
                Ok(WireCommand::Direct(vec![CMD_MOVE, position.code()]))
            }

            Command::Font { index } => {
                self.require_readerboard(model)?;
                if *index > 9 {
                    return Err(ProtocolError::BadFontIndex(*index));
                }
                Ok(WireCommand::Direct(vec![CMD_FONT, b'0' + index]))
            }

            Command::Dim { led, level } => Ok(WireCommand::Direct(vec![
                CMD_DIM,
                *led,
                hex_nybble(level >> 4),
                hex_nybble(*level),
            ])),

            Command::Sound { repeat, notes } => {
                let mut out = vec![CMD_SOUND, bool_code(*repeat, b'L')];
                out.extend_from_slice(&parse_text(notes)?);
                out.push(TEXT_TERMINATOR);
                Ok(WireCommand::Direct(out))
            }

            Command::Morse { led, text } => {
                let mut out = vec![CMD_MORSE, *led];
                out.extend_from_slice(&parse_text(text)?);
                out.push(TEXT_TERMINATOR);
                Ok(WireCommand::Direct(out))
            }

            Command::Configure {
                address,
                usb_speed,
                rs485_speed,
                global_address,
            } => {
                let addr = match address {
                    None => INT6_UNSPECIFIED,
                    Some(a) if *a > MAX_DEVICE_ADDRESS => {
                        return Err(ProtocolError::FieldOutOfRange {
                            field: "device address",
                            value: *a,
                        })
                    }
                    Some(a) => encode_int6(*a as i32),
                };
                if *global_address > MAX_DEVICE_ADDRESS {
                    return Err(ProtocolError::FieldOutOfRange {
                        field: "global address",
                        value: *global_address,
                    });
                }
                Ok(WireCommand::Direct(vec![
                    CMD_CONFIGURE,
                    addr,
                    encode_baud_rate(*usb_speed)?,
                    encode_baud_rate(*rs485_speed)?,
                    encode_int6(*global_address as i32),
                ]))
            }

            Command::Query => Ok(WireCommand::Direct(vec![CMD_QUERY])),
            Command::QueryStatus => Ok(WireCommand::Direct(vec![CMD_QUERY_STATUS])),

            Command::AllLightsOff => {
                // Point-to-point links have no broadcast-off primitive
                // and send the expansion directly; the readerboard form
                // is two commands with an embedded terminator.
                let direct = if model.is_busylight() {
                    vec![CMD_OFF]
                } else {
                    vec![CMD_CLEAR, USB_COMMAND_TERMINATOR, CMD_OFF]
                };
                Ok(WireCommand::BroadcastOff { direct })
            }

            Command::Clear => {
                self.require_readerboard(model)?;
                Ok(WireCommand::Direct(vec![CMD_CLEAR]))
            }

            Command::Off => Ok(WireCommand::Direct(vec![CMD_OFF])),

            Command::Test => {
                if !model.supports_test() {
                    return Err(ProtocolError::UnsupportedCommand {
                        command: self.name(),
                        model,
                    });
                }
                Ok(WireCommand::Direct(vec![CMD_TEST]))
            }

            Command::Save => Ok(WireCommand::Direct(vec![
                CMD_CONFIGURE,
                b'&',
                b'D',
                CMD_CONFIGURE,
            ])),

            Command::DiagBanners => Ok(WireCommand::Direct(vec![
                CMD_CONFIGURE,
                b'*',
                CMD_CONFIGURE,
            ])),
        }
    }

    fn require_readerboard(&self, model: HardwareModel) -> Result<(), ProtocolError> {
        if model.is_readerboard() {
            Ok(())
        } else {
            Err(ProtocolError::UnsupportedCommand {
                command: self.name(),
                model,
            })
        }
    }
}

fn bool_code(value: bool, if_true: u8) -> u8 {
    if value {
        if_true
    } else {
        b'.'
    }
}

fn led_verb(verb: u8, leds: &LedList) -> Vec<u8> {
    let mut out = Vec::with_capacity(leds.len() + 2);
    out.push(verb);
    out.extend_from_slice(leds.as_bytes());
    out.push(FIELD_TERMINATOR);
    out
}

fn hex_nybble(v: u8) -> u8 {
    match v & 0x0f {
        n @ 0..=9 => b'0' + n,
        n => b'A' + n - 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RGB: HardwareModel = HardwareModel::Readerboard3Rgb;
    const MONO: HardwareModel = HardwareModel::Readerboard3Mono;
    const BUSY1: HardwareModel = HardwareModel::Busylight1;
    const BUSY2: HardwareModel = HardwareModel::Busylight2;

    fn direct(cmd: Command, model: HardwareModel) -> Vec<u8> {
        match cmd.encode(model).unwrap() {
            WireCommand::Direct(bytes) => bytes,
            other => panic!("expected direct encoding, got {other:?}"),
        }
    }

    #[test]
    fn text_layout() {
        let cmd = Command::Text {
            merge: false,
            align: Alignment::Center,
            transition: Transition::None,
            text: "HI".to_string(),
        };
        assert_eq!(direct(cmd, RGB), b"T.^.HI\x1b");
    }

    #[test]
    fn text_rejected_on_busylight() {
        let cmd = Command::Text {
            merge: true,
            align: Alignment::None,
            transition: Transition::None,
            text: "HI".to_string(),
        };
        assert!(matches!(
            cmd.encode(BUSY2),
            Err(ProtocolError::UnsupportedCommand {
                command: "text",
                ..
            })
        ));
    }

    #[test]
    fn scroll_layout() {
        let cmd = Command::Scroll {
            repeat: true,
            text: "news".to_string(),
        };
        assert_eq!(direct(cmd, MONO), b"<Lnews\x1b");
    }

    #[test]
    fn light_single_led_short_form_everywhere() {
        let cmd = Command::Light {
            leds: LedList::parse("R").unwrap(),
        };
        assert_eq!(direct(cmd.clone(), BUSY1), b"SR");
        assert_eq!(direct(cmd, RGB), b"SR");
    }

    #[test]
    fn light_multiple_leds_needs_a_readerboard() {
        let cmd = Command::Light {
            leds: LedList::parse("RG").unwrap(),
        };
        assert_eq!(direct(cmd.clone(), RGB), b"LRG$");
        assert!(cmd.encode(BUSY2).is_err());
    }

    #[test]
    fn flash_default_and_custom_timing() {
        let leds = LedList::parse("RG").unwrap();
        let cmd = Command::Flash {
            leds: leds.clone(),
            timing: None,
        };
        assert_eq!(direct(cmd, BUSY1), b"FRG$");

        let cmd = Command::Flash {
            leds,
            timing: Some(SequenceTiming {
                up: 0.1,
                on: 0.5,
                down: 0.1,
                off: 1.0,
            }),
        };
        // tenths of a second as int6: 1, 5, 1, 10
        assert_eq!(direct(cmd, BUSY1), b"F/151:RG$");
    }

    #[test]
    fn flash_zero_timing_means_firmware_defaults() {
        let cmd = Command::Flash {
            leds: LedList::parse("R").unwrap(),
            timing: Some(SequenceTiming::default()),
        };
        assert_eq!(direct(cmd, BUSY1), b"FR$");
    }

    #[test]
    fn strobe_layout() {
        let cmd = Command::Strobe {
            leds: LedList::parse("B").unwrap(),
        };
        assert_eq!(direct(cmd, BUSY2), b"*B$");
    }

    #[test]
    fn graph_value_clamps_to_eight() {
        assert_eq!(direct(Command::Graph(GraphSeries::Value(3)), RGB), b"H3");
        assert_eq!(direct(Command::Graph(GraphSeries::Value(12)), RGB), b"H8");
    }

    #[test]
    fn graph_colors_layout() {
        let colors = [
            Color::Red,
            Color::Red,
            Color::Amber,
            Color::Amber,
            Color::Green,
            Color::Green,
            Color::Green,
            Color::Green,
        ];
        assert_eq!(
            direct(Command::Graph(GraphSeries::Colors(colors)), RGB),
            b"HK11332222"
        );
    }

    #[test]
    fn bitmap_plane_count_must_match_model() {
        let image = ImageBitmap::from_ascii(&["@@", ".@"], 2).unwrap();
        let cmd = Command::Bitmap {
            merge: false,
            position: Position::UNSPECIFIED,
            transition: Transition::None,
            image: image.clone(),
        };
        // planes are [0b01, 0b11] and [0, 0], hex per column
        assert_eq!(direct(cmd.clone(), MONO), b"I.~.0103$0000$");
        assert!(matches!(
            cmd.encode(RGB),
            Err(ProtocolError::WrongPlaneCount {
                expected: 4,
                actual: 2,
                ..
            })
        ));
        assert!(cmd.encode(BUSY2).is_err());
    }

    #[test]
    fn color_move_font_dim() {
        assert_eq!(
            direct(
                Command::Color {
                    color: Color::FlashingAmber
                },
                RGB
            ),
            b"K;"
        );
        assert_eq!(
            direct(
                Command::Move {
                    position: Position::column(2).unwrap()
                },
                RGB
            ),
            b"@2"
        );
        assert_eq!(direct(Command::Font { index: 1 }, RGB), b"A1");
        assert!(matches!(
            Command::Font { index: 10 }.encode(RGB),
            Err(ProtocolError::BadFontIndex(10))
        ));
        assert_eq!(
            direct(
                Command::Dim {
                    led: b'R',
                    level: 0xab
                },
                BUSY2
            ),
            b"DRAB"
        );
    }

    #[test]
    fn sound_and_morse_layouts() {
        let cmd = Command::Sound {
            repeat: false,
            notes: "ceg".to_string(),
        };
        assert_eq!(direct(cmd, BUSY2), b"B.ceg\x1b");

        let cmd = Command::Morse {
            led: b'B',
            text: "SOS".to_string(),
        };
        assert_eq!(direct(cmd, BUSY1), b"MBSOS\x1b");
    }

    #[test]
    fn configure_layout() {
        let cmd = Command::Configure {
            address: Some(5),
            usb_speed: 9600,
            rs485_speed: 19200,
            global_address: 15,
        };
        assert_eq!(direct(cmd, BUSY2), b"=557?");

        let cmd = Command::Configure {
            address: None,
            usb_speed: 9600,
            rs485_speed: 9600,
            global_address: 15,
        };
        assert_eq!(direct(cmd, BUSY2), b"=.55?");
    }

    #[test]
    fn configure_rejects_bad_values() {
        let cmd = Command::Configure {
            address: Some(64),
            usb_speed: 9600,
            rs485_speed: 9600,
            global_address: 15,
        };
        assert!(cmd.encode(BUSY2).is_err());
        let cmd = Command::Configure {
            address: Some(1),
            usb_speed: 110,
            rs485_speed: 9600,
            global_address: 15,
        };
        assert!(matches!(
            cmd.encode(BUSY2),
            Err(ProtocolError::InvalidBaudRate(110))
        ));
    }

    #[test]
    fn all_lights_off_expansions() {
        match Command::AllLightsOff.encode(BUSY1).unwrap() {
            WireCommand::BroadcastOff { direct } => assert_eq!(direct, b"X"),
            other => panic!("unexpected encoding {other:?}"),
        }
        match Command::AllLightsOff.encode(RGB).unwrap() {
            WireCommand::BroadcastOff { direct } => assert_eq!(direct, b"C\x04X"),
            other => panic!("unexpected encoding {other:?}"),
        }
    }

    #[test]
    fn fixed_verbs() {
        assert_eq!(direct(Command::Query, BUSY1), b"Q");
        assert_eq!(direct(Command::QueryStatus, BUSY1), b"?");
        assert_eq!(direct(Command::Clear, RGB), b"C");
        assert_eq!(direct(Command::Off, BUSY1), b"X");
        assert_eq!(direct(Command::Test, BUSY2), b"%");
        assert!(Command::Test.encode(BUSY1).is_err());
        assert_eq!(direct(Command::Save, BUSY1), b"=&D=");
        assert_eq!(direct(Command::DiagBanners, RGB), b"=*=");
    }
}
