//! Network framing and transmission.
//!
//! A network is one serial port plus the link discipline for it. The
//! same command payload is framed differently per link:
//!
//! - USB (point-to-point): payload followed by a ^D terminator. The
//!   device on the other end is implicit.
//! - RS-485 (multidrop): an addressed lead byte sequence, then the
//!   payload escaped so no payload byte carries the MSB. A single
//!   target with address < 16 uses the compact `1101aaaa` lead; any
//!   other target list uses `1111gggg` followed by a count byte and one
//!   `00aaaaaa` byte per target.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use marquee_protocol::{escape_485, USB_COMMAND_TERMINATOR};

use crate::driver::Transport;
use crate::error::FleetError;

/// Link discipline on a serial port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkKind {
    /// Point-to-point USB serial link to a single device.
    #[serde(rename = "usb", alias = "USB")]
    Usb,
    /// RS-485 multidrop network with addressed devices.
    #[serde(rename = "485", alias = "rs485", alias = "RS-485")]
    Rs485,
}

/// One serial network and the transport that reaches it.
///
/// The transport mutex is the per-network transmission lock: whoever
/// holds it owns the wire, so frames from concurrent requests never
/// interleave.
pub struct Network {
    /// Network id from the configuration.
    pub id: String,
    /// Link discipline.
    pub kind: NetworkKind,
    /// Broadcast address devices on this network listen to.
    pub global_address: u8,
    transport: Mutex<Box<dyn Transport>>,
}

impl Network {
    pub fn new(
        id: String,
        kind: NetworkKind,
        global_address: u8,
        transport: Box<dyn Transport>,
    ) -> Network {
        Network {
            id,
            kind,
            global_address,
            transport: Mutex::new(transport),
        }
    }

    /// Frame a command payload for transmission to the given targets.
    ///
    /// Framing is pure; nothing is sent.
    pub fn frame(&self, targets: &[u8], payload: &[u8]) -> Result<Vec<u8>, FleetError> {
        match self.kind {
            NetworkKind::Usb => {
                let mut out = payload.to_vec();
                out.push(USB_COMMAND_TERMINATOR);
                Ok(out)
            }
            NetworkKind::Rs485 => {
                let mut out = self.lead_bytes(targets)?;
                out.extend_from_slice(&escape_485(payload));
                Ok(out)
            }
        }
    }

    /// Frame the all-lights-off operation.
    ///
    /// `direct` is the point-to-point expansion, possibly several
    /// commands separated by ^D. USB links send it as-is; RS-485 links
    /// frame each constituent command for the target list.
    pub fn all_lights_off_frame(
        &self,
        targets: &[u8],
        direct: &[u8],
    ) -> Result<Vec<u8>, FleetError> {
        match self.kind {
            NetworkKind::Usb => {
                let mut out = direct.to_vec();
                out.push(USB_COMMAND_TERMINATOR);
                Ok(out)
            }
            NetworkKind::Rs485 => {
                let mut out = Vec::new();
                for command in direct.split(|&b| b == USB_COMMAND_TERMINATOR) {
                    out.extend(self.frame(targets, command)?);
                }
                Ok(out)
            }
        }
    }

    /// Deliver the all-lights-off operation through the driver's
    /// native broadcast primitive.
    ///
    /// Fails with [`FleetError::BroadcastOffUnsupported`] when the
    /// driver has no primitive; the caller is expected to fall back to
    /// ordinary per-command delivery.
    pub fn broadcast_off(&self, targets: &[u8], direct: &[u8]) -> Result<(), FleetError> {
        let raw = self.all_lights_off_frame(targets, direct)?;
        self.transport.lock().send_broadcast_off(&raw)
    }

    /// Transmit pre-framed bytes, holding the network lock for the
    /// duration of the send.
    pub fn transmit(&self, raw: &[u8]) -> Result<(), FleetError> {
        self.transport.lock().send(raw)
    }

    /// Transmit pre-framed bytes and read one reply, holding the
    /// network lock across the whole exchange so no other traffic can
    /// land between command and reply.
    pub fn transact(&self, raw: &[u8]) -> Result<Vec<u8>, FleetError> {
        let mut transport = self.transport.lock();
        transport.send(raw)?;
        let reply = transport.receive()?;
        match self.kind {
            NetworkKind::Usb => Ok(reply),
            NetworkKind::Rs485 => Ok(marquee_protocol::unescape_485(&reply)?),
        }
    }

    fn lead_bytes(&self, targets: &[u8]) -> Result<Vec<u8>, FleetError> {
        if targets.is_empty() {
            return Err(FleetError::EmptyTargetList);
        }
        for &addr in targets {
            if addr > 63 {
                return Err(FleetError::AddressOutOfRange(addr));
            }
        }
        if targets.len() == 1 && targets[0] < 16 {
            return Ok(vec![0xd0 | targets[0]]);
        }
        let mut lead = Vec::with_capacity(targets.len() + 2);
        lead.push(0xf0 | (self.global_address & 0x0f));
        lead.push(targets.len() as u8);
        lead.extend(targets.iter().map(|&addr| addr & 0x3f));
        Ok(lead)
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("global_address", &self.global_address)
            .finish_non_exhaustive()
    }
}
