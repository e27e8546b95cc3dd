//! The dispatch engine.
//!
//! Takes a raw target list and a [`Command`], resolves the targets
//! against the fleet, and delivers the command to every group: encode
//! once per (network, model) group, record the state effect on each
//! targeted device, frame, and transmit under the network lock.
//!
//! Failures during delivery are counted and logged, never fatal: one
//! bad device or network must not stop the command from reaching its
//! siblings. Only a malformed request aborts the whole operation.

use std::collections::BTreeMap;

use marquee_fleet::{Fleet, Network};
use marquee_protocol::{
    decode_device_status, decode_led_status, Command, DeviceStatus, DiscreteLedStatus,
    ProtocolError, WireCommand,
};

use crate::error::DispatchError;
use crate::targets::{resolve, TargetGroup};

/// Outcome of a broadcast send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Number of per-target and per-network failures. Zero means the
    /// command reached everything it was aimed at.
    pub errors: usize,
}

impl DispatchReport {
    /// True when nothing went wrong.
    pub fn ok(&self) -> bool {
        self.errors == 0
    }
}

/// Outcome of a query cycle: one decoded reply per answering device.
#[derive(Debug, Clone)]
pub struct QueryReport<T> {
    /// Replies keyed by device address.
    pub replies: BTreeMap<u8, T>,
    /// Devices that failed to answer or answered garbage.
    pub errors: usize,
}

/// Command dispatcher over a built fleet.
pub struct Dispatcher<'f> {
    fleet: &'f Fleet,
}

impl<'f> Dispatcher<'f> {
    pub fn new(fleet: &'f Fleet) -> Dispatcher<'f> {
        Dispatcher { fleet }
    }

    /// Send a fire-and-forget command to every device in the target
    /// list.
    ///
    /// Commands that read replies must use [`query_device_status`] or
    /// [`query_led_status`] instead.
    ///
    /// [`query_device_status`]: Dispatcher::query_device_status
    /// [`query_led_status`]: Dispatcher::query_led_status
    pub fn send_command(
        &self,
        targets: &str,
        command: &Command,
    ) -> Result<DispatchReport, DispatchError> {
        if command.expects_reply() {
            return Err(DispatchError::ExpectsReply);
        }
        let resolution = resolve(self.fleet, targets)?;
        if resolution.is_global && !global_allowed(command) {
            return Err(DispatchError::GlobalNotAllowed);
        }

        let mut errors = resolution.unknown;
        for group in &resolution.groups {
            if let Err(e) = self.send_to_group(group, command) {
                errors += 1;
                tracing::warn!(
                    network = %group.network_id,
                    model = %group.model,
                    command = command.name(),
                    error = %e,
                    "failed to deliver command to group"
                );
            }
        }
        Ok(DispatchReport { errors })
    }

    /// Run a full status query against every target, one send/receive
    /// exchange per device so replies are unambiguous.
    pub fn query_device_status(
        &self,
        targets: &str,
    ) -> Result<QueryReport<DeviceStatus>, DispatchError> {
        self.query(targets, &Command::Query, decode_device_status)
    }

    /// Run a discrete-LED status query against every target.
    pub fn query_led_status(
        &self,
        targets: &str,
    ) -> Result<QueryReport<DiscreteLedStatus>, DispatchError> {
        self.query(targets, &Command::QueryStatus, decode_led_status)
    }

    /// The last-known LED state of every target, straight from the
    /// fleet's records; nothing is sent to the hardware.
    pub fn current_state(
        &self,
        targets: &str,
    ) -> Result<QueryReport<DiscreteLedStatus>, DispatchError> {
        let resolution = resolve(self.fleet, targets)?;
        let mut replies = BTreeMap::new();
        for group in &resolution.groups {
            for &address in &group.addresses {
                if let Some(device) = self.fleet.device(address) {
                    replies.insert(address, device.snapshot());
                }
            }
        }
        Ok(QueryReport {
            replies,
            errors: resolution.unknown,
        })
    }

    fn send_to_group(&self, group: &TargetGroup, command: &Command) -> Result<(), DispatchError> {
        let network = self.fleet.network(&group.network_id)?;
        match command.encode(group.model)? {
            WireCommand::Direct(payload) => {
                let raw = network.frame(&group.addresses, &payload)?;
                self.note_state_effects(group, command);
                network.transmit(&raw)?;
            }
            WireCommand::BroadcastOff { direct } => {
                self.note_state_effects(group, command);
                self.send_all_lights_off(network, group, &direct)?;
            }
        }
        Ok(())
    }

    /// Deliver all-lights-off, walking the fallback chain in order: the
    /// driver's broadcast-off primitive, then the `Off` verb, then
    /// `Clear`. The first alternative delivered in full wins; running
    /// out of alternatives is a hard error for this network.
    fn send_all_lights_off(
        &self,
        network: &Network,
        group: &TargetGroup,
        direct: &[u8],
    ) -> Result<(), DispatchError> {
        match network.broadcast_off(&group.addresses, direct) {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::warn!(network = %network.id, error = %e, "broadcast off unavailable, trying fallbacks");
            }
        }
        for fallback in [Command::Off, Command::Clear] {
            // Clear is a readerboard verb; other models skip it here
            let Ok(WireCommand::Direct(payload)) = fallback.encode(group.model) else {
                continue;
            };
            let outcome = network
                .frame(&group.addresses, &payload)
                .and_then(|raw| network.transmit(&raw));
            match outcome {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        network = %network.id,
                        command = fallback.name(),
                        error = %e,
                        "fallback delivery failed"
                    );
                }
            }
        }
        Err(DispatchError::AllLightsOffFailed {
            network: network.id.clone(),
        })
    }

    /// Record what the command does to each device's discrete LEDs, so
    /// the last-known state tracks what the hardware was told.
    fn note_state_effects(&self, group: &TargetGroup, command: &Command) {
        for &address in &group.addresses {
            let Some(device) = self.fleet.device(address) else {
                continue;
            };
            match command {
                Command::Light { leds } => device.record_lights(leds.as_bytes()),
                Command::Flash { leds, timing } => device.record_flash(leds.as_bytes(), *timing),
                Command::Strobe { leds } => device.record_strobe(leds.as_bytes()),
                Command::Off | Command::AllLightsOff => device.record_all_off(),
                _ => {}
            }
        }
    }

    fn query<T>(
        &self,
        targets: &str,
        command: &Command,
        decode: fn(&[u8]) -> Result<T, ProtocolError>,
    ) -> Result<QueryReport<T>, DispatchError> {
        let resolution = resolve(self.fleet, targets)?;
        let mut errors = resolution.unknown;
        let mut replies = BTreeMap::new();

        for group in &resolution.groups {
            let network = match self.fleet.network(&group.network_id) {
                Ok(network) => network,
                Err(e) => {
                    errors += 1;
                    tracing::warn!(network = %group.network_id, error = %e, "cannot query group");
                    continue;
                }
            };
            let payload = match command.encode(group.model) {
                Ok(WireCommand::Direct(payload)) => payload,
                _ => {
                    errors += 1;
                    continue;
                }
            };
            for &address in &group.addresses {
                // one device per exchange; the reply has no source field
                let exchange = network
                    .frame(&[address], &payload)
                    .and_then(|raw| network.transact(&raw));
                match exchange {
                    Ok(reply) => match decode(&reply) {
                        Ok(status) => {
                            replies.insert(address, status);
                        }
                        Err(e) => {
                            errors += 1;
                            tracing::warn!(device = address, error = %e, "reply not understood");
                        }
                    },
                    Err(e) => {
                        errors += 1;
                        tracing::warn!(device = address, error = %e, "device did not answer");
                    }
                }
            }
        }
        Ok(QueryReport { replies, errors })
    }
}

/// Whether a command is safe to aim at the global address. Reprogramming
/// every device's settings in one broadcast is not.
fn global_allowed(command: &Command) -> bool {
    !matches!(command, Command::Configure { .. } | Command::Save)
}
