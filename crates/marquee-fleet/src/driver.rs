//! Serial transports.

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use crate::error::FleetError;

/// Byte transport to a signage network.
///
/// Implementations carry the open port; the [`Network`] owns the lock
/// around them. Tests substitute in-memory transports.
///
/// [`Network`]: crate::network::Network
pub trait Transport: Send {
    /// Write raw framed bytes to the wire.
    fn send(&mut self, data: &[u8]) -> Result<(), FleetError>;

    /// Read one reply: everything up to (not including) the trailing
    /// newline.
    fn receive(&mut self) -> Result<Vec<u8>, FleetError>;

    /// Send the driver's native all-lights-off broadcast, already
    /// framed for the link. Drivers without the primitive keep the
    /// default and the dispatcher falls back to per-command delivery.
    fn send_broadcast_off(&mut self, raw: &[u8]) -> Result<(), FleetError> {
        let _ = raw;
        Err(FleetError::BroadcastOffUnsupported)
    }
}

/// Replies longer than this are garbage, not data.
const MAX_REPLY_LEN: usize = 4096;

/// How long a device gets to finish a reply.
const REPLY_TIMEOUT: Duration = Duration::from_millis(500);

/// A [`Transport`] over a real serial port.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open the serial port at the given speed.
    pub fn open(path: &str, baud_rate: u32) -> Result<SerialTransport, FleetError> {
        let port = serialport::new(path, baud_rate)
            .timeout(REPLY_TIMEOUT)
            .open()?;
        Ok(SerialTransport { port })
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, data: &[u8]) -> Result<(), FleetError> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<Vec<u8>, FleetError> {
        read_reply(&mut self.port, Instant::now() + REPLY_TIMEOUT)
    }

    // the serial wire has no separate broadcast channel; the framed
    // sequence goes out like any other traffic
    fn send_broadcast_off(&mut self, raw: &[u8]) -> Result<(), FleetError> {
        self.send(raw)
    }
}

fn read_reply<R: Read>(port: &mut R, deadline: Instant) -> Result<Vec<u8>, FleetError> {
    let mut reply = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match port.read(&mut byte) {
            // a zero-length read means the stream is gone (unplugged
            // adapter); give it until the deadline, then time out
            Ok(0) => {
                if Instant::now() >= deadline {
                    return Err(FleetError::ReplyTimeout);
                }
            }
            Ok(_) => {
                if byte[0] == b'\n' {
                    return Ok(reply);
                }
                reply.push(byte[0]);
                if reply.len() > MAX_REPLY_LEN {
                    log::warn!("device reply exceeded {MAX_REPLY_LEN} bytes, discarding");
                    return Err(FleetError::ReplyTimeout);
                }
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => {
                return Err(FleetError::ReplyTimeout);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_reply_stops_at_newline() {
        let mut stream = Cursor::new(b"L0G$\nleftover".to_vec());
        let reply = read_reply(&mut stream, Instant::now() + REPLY_TIMEOUT).unwrap();
        assert_eq!(reply, b"L0G$");
    }

    #[test]
    fn dead_stream_times_out_instead_of_spinning() {
        let result = read_reply(&mut std::io::empty(), Instant::now());
        assert!(matches!(result, Err(FleetError::ReplyTimeout)));
    }
}
