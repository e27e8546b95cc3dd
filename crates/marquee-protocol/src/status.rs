//! Query reply decoders.
//!
//! Devices answer the `Q` and `?` verbs with self-describing replies:
//! a fixed header of single-byte codes followed by string fields, each
//! terminated by `$` or ESC. These decoders turn a complete reply
//! (everything up to the trailing newline) into [`DeviceStatus`] or
//! [`DiscreteLedStatus`].

use crate::error::ProtocolError;
use crate::image::ImageBitmap;
use crate::types::{
    decode_baud_rate, parse_address, DeviceStatus, DiscreteLedStatus, EepromKind, LedSequence,
    ModelClass, SequenceTiming, SoundSupport,
};

/// Reply format version this decoder understands.
const FORMAT_VERSION: u8 = b'0';

/// Decode a `?` (LED status) reply.
pub fn decode_led_status(reply: &[u8]) -> Result<DiscreteLedStatus, ProtocolError> {
    if reply.len() < 9 {
        return Err(ProtocolError::ReplyTooShort {
            expected: 9,
            actual: reply.len(),
        });
    }
    let (status, idx) = parse_status_leds(reply, 0)?;
    if idx < reply.len() {
        log::warn!(
            "LED status reply had {} bytes but only {} were expected: {:?}",
            reply.len(),
            idx,
            reply
        );
    }
    Ok(status)
}

/// Decode a `Q` (full device status) reply.
pub fn decode_device_status(reply: &[u8]) -> Result<DeviceStatus, ProtocolError> {
    if reply.len() < 17 {
        return Err(ProtocolError::ReplyTooShort {
            expected: 17,
            actual: reply.len(),
        });
    }
    if reply[0] != b'Q' || reply[3] != b'=' || reply[10] != b'$' {
        return Err(ProtocolError::BadReplyHeader);
    }
    if reply[1] != FORMAT_VERSION {
        return Err(ProtocolError::UnsupportedFormatVersion(reply[1] as char));
    }

    let model_class = ModelClass::from_code(reply[2]);
    let address = parse_address(reply[4]);
    let usb_speed = decode_baud_rate(reply[5])?;
    let rs485_speed = decode_baud_rate(reply[6])?;
    let global_address = parse_address(reply[7]);
    let eeprom = EepromKind::from_code(reply[8])?;
    let sound = SoundSupport::from_code(reply[9])?;

    let (hardware_revision, idx) = extract_string(reply, 11, Some(b'V'), "hardware revision")?;
    let (firmware_revision, idx) = extract_string(reply, idx, Some(b'R'), "firmware revision")?;
    let (serial, idx) = extract_string(reply, idx, Some(b'S'), "serial number")?;
    let (leds, idx) = parse_status_leds(reply, idx)?;
    let (dimmer_hex, mut idx) = extract_string(reply, idx, Some(b'D'), "dimmers")?;

    let dimmers = parse_dimmers(&dimmer_hex)?;

    let bitmap = match model_class {
        ModelClass::Busylight => None,
        class => {
            let depth = if class == ModelClass::MatrixRgb { 4 } else { 2 };
            let mut planes = Vec::with_capacity(depth);
            let (first, next) = extract_string(reply, idx, Some(b'M'), "bitmap")?;
            idx = next;
            planes.push(parse_bitmap_plane(&first)?);
            while planes.len() < depth {
                let (hex, next) = extract_string(reply, idx, None, "bitmap")?;
                idx = next;
                planes.push(parse_bitmap_plane(&hex)?);
            }
            Some(ImageBitmap {
                depth,
                width: 64,
                planes,
            })
        }
    };

    if idx < reply.len() {
        log::warn!(
            "device status reply had {} bytes but only {} were expected: {:?}",
            reply.len(),
            idx,
            reply
        );
    }

    Ok(DeviceStatus {
        model_class,
        address,
        global_address,
        usb_speed,
        rs485_speed,
        eeprom,
        sound,
        hardware_revision,
        firmware_revision,
        serial,
        leds,
        dimmers,
        bitmap,
    })
}

/// Extract a `$`/ESC-terminated string field starting at `idx`,
/// returning the field and the index past its terminator.
fn extract_string(
    src: &[u8],
    mut idx: usize,
    prefix: Option<u8>,
    field: &'static str,
) -> Result<(String, usize), ProtocolError> {
    if idx >= src.len() {
        return Err(ProtocolError::MissingTerminator { field });
    }
    if let Some(tag) = prefix {
        if src[idx] != tag {
            return Err(ProtocolError::MissingPrefix {
                field,
                prefix: tag as char,
            });
        }
        idx += 1;
    }
    let end = src[idx..]
        .iter()
        .position(|&b| b == b'$' || b == 0x1b)
        .ok_or(ProtocolError::MissingTerminator { field })?;
    let text = std::str::from_utf8(&src[idx..idx + end])
        .map_err(|_| ProtocolError::InvalidUtf8 { field })?;
    Ok((text.to_string(), idx + end + 1))
}

/// Parse the three LED status fields (`L`, `F`, `S`) starting at `idx`.
fn parse_status_leds(
    src: &[u8],
    idx: usize,
) -> Result<(DiscreteLedStatus, usize), ProtocolError> {
    let (lights, idx) = extract_string(src, idx, Some(b'L'), "status lights")?;
    if lights.len() < 2 {
        return Err(ProtocolError::ReplyTooShort {
            expected: 2,
            actual: lights.len(),
        });
    }
    if lights.as_bytes()[0] != FORMAT_VERSION {
        return Err(ProtocolError::UnsupportedFormatVersion(
            lights.as_bytes()[0] as char,
        ));
    }

    let (flasher_field, idx) = extract_string(src, idx, Some(b'F'), "flasher")?;
    let (strober_field, idx) = extract_string(src, idx, Some(b'S'), "strober")?;

    let status = DiscreteLedStatus {
        status_lights: lights[1..].to_string(),
        flasher: parse_led_sequence(flasher_field.as_bytes(), "flasher")?,
        strober: parse_led_sequence(strober_field.as_bytes(), "strober")?,
    };
    Ok((status, idx))
}

/// Parse a flasher/strober sequence field:
/// `[/ up on down off] R|S _|{pos @ led...}`.
fn parse_led_sequence(src: &[u8], field: &'static str) -> Result<LedSequence, ProtocolError> {
    if src.len() < 2 {
        return Err(ProtocolError::ReplyTooShort {
            expected: 2,
            actual: src.len(),
        });
    }
    let mut seq = LedSequence::default();
    let mut idx = 0;

    if src[0] == b'/' {
        if src.len() < 5 {
            return Err(ProtocolError::ReplyTooShort {
                expected: 5,
                actual: src.len(),
            });
        }
        let mut phases = [0.0f32; 4];
        for (slot, &code) in phases.iter_mut().zip(&src[1..5]) {
            if !(b'0'..=b'o').contains(&code) {
                return Err(ProtocolError::FieldOutOfRange { field, value: code });
            }
            *slot = f32::from(code - b'0') / 10.0;
        }
        seq.timing = Some(SequenceTiming {
            up: phases[0],
            on: phases[1],
            down: phases[2],
            off: phases[3],
        });
        idx = 5;
    }

    if idx + 1 >= src.len() {
        return Err(ProtocolError::ReplyTooShort {
            expected: idx + 2,
            actual: src.len(),
        });
    }
    match src[idx] {
        b'R' => seq.is_running = true,
        b'S' => {}
        value => return Err(ProtocolError::FieldOutOfRange { field, value }),
    }

    if src[idx + 1] == b'_' {
        return Ok(seq);
    }
    if src.len() < idx + 3 || src[idx + 2] != b'@' {
        return Err(ProtocolError::MissingPrefix { field, prefix: '@' });
    }
    if !(b'0'..=b'o').contains(&src[idx + 1]) {
        return Err(ProtocolError::FieldOutOfRange {
            field,
            value: src[idx + 1],
        });
    }
    seq.position = Some(src[idx + 1] - b'0');
    seq.sequence = src[idx + 3..].to_vec();
    Ok(seq)
}

/// Parse the dimmer block: pairs of hex digits, `__` meaning "unset".
fn parse_dimmers(hex: &str) -> Result<Vec<Option<u8>>, ProtocolError> {
    let bytes = hex.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(ProtocolError::InvalidHex { field: "dimmers" });
    }
    let mut dimmers = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        if pair == b"__" {
            dimmers.push(None);
        } else {
            let value = u8::from_str_radix(
                std::str::from_utf8(pair).map_err(|_| ProtocolError::InvalidUtf8 {
                    field: "dimmers",
                })?,
                16,
            )
            .map_err(|_| ProtocolError::InvalidHex { field: "dimmers" })?;
            dimmers.push(Some(value));
        }
    }
    Ok(dimmers)
}

/// Parse one hex-encoded bitmap plane into 64 column bytes, zero-padded
/// on the right.
fn parse_bitmap_plane(hex: &str) -> Result<Vec<u8>, ProtocolError> {
    let bytes = hex.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(ProtocolError::InvalidHex { field: "bitmap" });
    }
    if bytes.len() > 128 {
        return Err(ProtocolError::PlaneTooLong);
    }
    let mut plane = vec![0u8; 64];
    for (col, pair) in bytes.chunks_exact(2).enumerate() {
        plane[col] = u8::from_str_radix(
            std::str::from_utf8(pair).map_err(|_| ProtocolError::InvalidUtf8 {
                field: "bitmap",
            })?,
            16,
        )
        .map_err(|_| ProtocolError::InvalidHex { field: "bitmap" })?;
    }
    Ok(plane)
}

#[cfg(test)]
mod tests {
    use super::*;

    // A well-formed busylight reply: header, revision strings, LED
    // status, and a dimmer block with one unset slot.
    fn busylight_reply() -> Vec<u8> {
        b"Q0B=505?_S$Vhw1.0$Rfw2.3$Ssn42$L0G______$FR1@GR$SS_$D40__$".to_vec()
    }

    #[test]
    fn device_status_header_fields() {
        let stat = decode_device_status(&busylight_reply()).unwrap();
        assert_eq!(stat.model_class, ModelClass::Busylight);
        assert_eq!(stat.address, 5);
        assert_eq!(stat.usb_speed, 300);
        assert_eq!(stat.rs485_speed, 9600);
        assert_eq!(stat.global_address, 15);
        assert_eq!(stat.eeprom, EepromKind::None);
        assert_eq!(stat.sound, SoundSupport::Speaker);
        assert_eq!(stat.hardware_revision, "hw1.0");
        assert_eq!(stat.firmware_revision, "fw2.3");
        assert_eq!(stat.serial, "sn42");
        assert_eq!(stat.dimmers, vec![Some(0x40), None]);
        assert!(stat.bitmap.is_none());
    }

    #[test]
    fn device_status_led_fields() {
        let stat = decode_device_status(&busylight_reply()).unwrap();
        assert_eq!(stat.leds.status_lights, "G______");
        assert!(stat.leds.flasher.is_running);
        assert_eq!(stat.leds.flasher.position, Some(1));
        assert_eq!(stat.leds.flasher.sequence, b"GR");
        assert!(!stat.leds.strober.is_running);
        assert!(stat.leds.strober.sequence.is_empty());
    }

    #[test]
    fn device_status_matrix_planes() {
        let reply = b"Q0M=.55?__$Vv$Rr$Ss$L0________$FS_$SS_$D__$MFF00$0102$".to_vec();
        let stat = decode_device_status(&reply).unwrap();
        assert_eq!(stat.model_class, ModelClass::MatrixMono);
        assert_eq!(stat.address, 0xff); // RS-485 disabled
        let bitmap = stat.bitmap.unwrap();
        assert_eq!(bitmap.depth, 2);
        assert_eq!(bitmap.width, 64);
        assert_eq!(bitmap.planes[0][0], 0xff);
        assert_eq!(bitmap.planes[0][1], 0x00);
        assert_eq!(bitmap.planes[0][2], 0x00); // zero padding
        assert_eq!(bitmap.planes[1][0], 0x01);
        assert_eq!(bitmap.planes[1][1], 0x02);
    }

    #[test]
    fn device_status_rgb_needs_four_planes() {
        let reply = b"Q0C=055?IT$Vv$Rr$Ss$L0_$FS_$SS_$D$M01$02$03$04$".to_vec();
        let stat = decode_device_status(&reply).unwrap();
        assert_eq!(stat.model_class, ModelClass::MatrixRgb);
        assert_eq!(stat.eeprom, EepromKind::Internal);
        assert_eq!(stat.sound, SoundSupport::SpeakerTimer);
        let bitmap = stat.bitmap.unwrap();
        assert_eq!(bitmap.depth, 4);
        assert_eq!(bitmap.planes.len(), 4);
        assert_eq!(bitmap.planes[3][0], 0x04);

        let truncated = b"Q0C=055?IT$Vv$Rr$Ss$L0_$FS_$SS_$D$M01$02$".to_vec();
        assert!(matches!(
            decode_device_status(&truncated),
            Err(ProtocolError::MissingTerminator { field: "bitmap" })
        ));
    }

    #[test]
    fn device_status_rejects_bad_header() {
        assert!(matches!(
            decode_device_status(b"Q0B"),
            Err(ProtocolError::ReplyTooShort { .. })
        ));
        assert!(matches!(
            decode_device_status(b"X0B=505?_S$Vv$Rr$Ss$"),
            Err(ProtocolError::BadReplyHeader)
        ));
        assert!(matches!(
            decode_device_status(b"Q1B=505?_S$Vv$Rr$Ss$"),
            Err(ProtocolError::UnsupportedFormatVersion('1'))
        ));
    }

    #[test]
    fn led_status_reply() {
        let stat = decode_led_status(b"L0G____W_$F/1510R2@RW$SS_$").unwrap();
        assert_eq!(stat.status_lights, "G____W_");
        assert!(stat.flasher.is_running);
        assert_eq!(
            stat.flasher.timing,
            Some(SequenceTiming {
                up: 0.1,
                on: 0.5,
                down: 0.1,
                off: 0.0,
            })
        );
        assert_eq!(stat.flasher.position, Some(2));
        assert_eq!(stat.flasher.sequence, b"RW");
    }

    #[test]
    fn led_status_rejects_malformed_sequences() {
        assert!(matches!(
            decode_led_status(b"L0_$FX_$SS_$"),
            Err(ProtocolError::FieldOutOfRange {
                field: "flasher",
                ..
            })
        ));
        assert!(matches!(
            decode_led_status(b"L0_$FR1X$SS_$"),
            Err(ProtocolError::MissingPrefix {
                field: "flasher",
                prefix: '@'
            })
        ));
        assert!(matches!(
            decode_led_status(b"L1_$FS_$SS_$"),
            Err(ProtocolError::UnsupportedFormatVersion('1'))
        ));
    }

    #[test]
    fn header_fields_round_trip_through_the_encoders() {
        let reply = busylight_reply();
        let stat = decode_device_status(&reply).unwrap();
        let header = [
            b'Q',
            b'0',
            stat.model_class.code(),
            b'=',
            crate::types::encode_int6(i32::from(stat.address)),
            crate::types::encode_baud_rate(stat.usb_speed).unwrap(),
            crate::types::encode_baud_rate(stat.rs485_speed).unwrap(),
            crate::types::encode_int6(i32::from(stat.global_address)),
            stat.eeprom.code(),
            stat.sound.code(),
            b'$',
        ];
        assert_eq!(&reply[..11], &header);
    }

    #[test]
    fn dimmer_block_parses_unset_slots() {
        assert_eq!(
            parse_dimmers("40__FF").unwrap(),
            vec![Some(0x40), None, Some(0xff)]
        );
        assert!(parse_dimmers("4").is_err());
        assert!(parse_dimmers("4G").is_err());
    }
}
