//! Per-device state.

use parking_lot::Mutex;

use marquee_protocol::{DiscreteLedStatus, HardwareModel, SequenceTiming};

use crate::config::DeviceConfig;

/// One signage device and its last-known LED state.
///
/// The firmware is fire-and-forget for most verbs, so the last-known
/// state is this software's record of what it has told the device to do.
/// The state mutex is per-device: recording a state change never blocks
/// traffic to other devices.
#[derive(Debug)]
pub struct Device {
    /// RS-485 address (also the device id on point-to-point networks).
    pub address: u8,
    /// Hardware model.
    pub model: HardwareModel,
    /// Id of the network this device hangs off of.
    pub network_id: String,
    /// Free-form note from the configuration.
    pub description: String,
    /// Serial number from the configuration.
    pub serial: String,
    /// The discrete LEDs physically installed, in order.
    pub lights_installed: String,
    state: Mutex<DiscreteLedStatus>,
}

impl Device {
    /// Build a device from its configuration entry. The initial
    /// last-known state is everything-off.
    pub fn new(address: u8, config: &DeviceConfig) -> Device {
        let lights_installed = config.lights_installed().to_string();
        Device {
            address,
            model: config.device_type,
            network_id: config.network_id.clone(),
            description: config.description.clone(),
            serial: config.serial.clone(),
            state: Mutex::new(DiscreteLedStatus::all_off(&lights_installed)),
            lights_installed,
        }
    }

    /// A copy of the last-known LED state.
    pub fn snapshot(&self) -> DiscreteLedStatus {
        self.state.lock().clone()
    }

    /// Record a steady light command: exactly the listed LEDs are lit
    /// and the flasher is stopped.
    pub fn record_lights(&self, lit: &[u8]) {
        let mut state = self.state.lock();
        state.set_lights(lit, &self.lights_installed);
        state.flasher.clear();
    }

    /// Record a flash command. An empty list stops the flasher; a
    /// non-empty list starts it, with the first LED in the list counted
    /// as currently lit.
    pub fn record_flash(&self, leds: &[u8], timing: Option<SequenceTiming>) {
        let mut state = self.state.lock();
        if leds.is_empty() {
            state.flasher.clear();
        } else {
            state.set_lights(&leds[..1], &self.lights_installed);
            state.flasher.set(leds, timing);
        }
    }

    /// Record a strobe command. An empty list stops the strober.
    pub fn record_strobe(&self, leds: &[u8]) {
        self.state.lock().strober.set(leds, None);
    }

    /// Record that everything was turned off.
    pub fn record_all_off(&self) {
        self.state.lock().clear(&self.lights_installed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busylight() -> Device {
        let config = DeviceConfig {
            device_type: HardwareModel::Busylight2,
            network_id: "net1".to_string(),
            description: String::new(),
            serial: String::new(),
            lights_installed: None,
        };
        Device::new(7, &config)
    }

    #[test]
    fn starts_all_off() {
        let dev = busylight();
        assert_eq!(dev.lights_installed, "GyYrRBW");
        assert_eq!(dev.snapshot().status_lights, "_______");
    }

    #[test]
    fn record_lights_stops_flasher() {
        let dev = busylight();
        dev.record_flash(b"RG", None);
        dev.record_lights(b"W");
        let state = dev.snapshot();
        assert_eq!(state.status_lights, "______W");
        assert!(!state.flasher.is_running);
        assert!(state.flasher.sequence.is_empty());
    }

    #[test]
    fn record_flash_lights_first_led() {
        let dev = busylight();
        dev.record_flash(b"RG", None);
        let state = dev.snapshot();
        assert_eq!(state.status_lights, "____R__");
        assert!(state.flasher.is_running);
        assert_eq!(state.flasher.sequence, b"RG");

        dev.record_flash(b"", None);
        assert!(!dev.snapshot().flasher.is_running);
    }

    #[test]
    fn record_strobe_and_all_off() {
        let dev = busylight();
        dev.record_strobe(b"B");
        assert!(dev.snapshot().strober.is_running);
        dev.record_all_off();
        let state = dev.snapshot();
        assert_eq!(state.status_lights, "_______");
        assert!(!state.strober.is_running);
    }
}
