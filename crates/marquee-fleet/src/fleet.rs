//! The device fleet.

use std::collections::BTreeMap;

use crate::config::{FleetConfig, NetworkConfig};
use crate::device::Device;
use crate::driver::{SerialTransport, Transport};
use crate::error::FleetError;
use crate::network::Network;

/// Every configured device and network, fully built and ready to talk.
///
/// Membership is fixed at build time; per-device and per-network state
/// behind the individual locks is the only thing that changes, so the
/// fleet itself can be shared freely.
pub struct Fleet {
    global_address: u8,
    devices: BTreeMap<u8, Device>,
    networks: BTreeMap<String, Network>,
}

impl Fleet {
    /// Build a fleet from its configuration, opening a real serial port
    /// for each network.
    pub fn open(config: &FleetConfig) -> Result<Fleet, FleetError> {
        Fleet::build(config, |_, net| {
            Ok(Box::new(SerialTransport::open(&net.device, net.baud_rate)?))
        })
    }

    /// Build a fleet using a caller-supplied transport factory. Tests
    /// use this to inject in-memory transports.
    pub fn build<F>(config: &FleetConfig, mut open: F) -> Result<Fleet, FleetError>
    where
        F: FnMut(&str, &NetworkConfig) -> Result<Box<dyn Transport>, FleetError>,
    {
        config.validate()?;

        let mut networks = BTreeMap::new();
        for (id, net) in &config.networks {
            let transport = open(id, net)?;
            networks.insert(
                id.clone(),
                Network::new(
                    id.clone(),
                    net.connection_type,
                    config.global_address,
                    transport,
                ),
            );
        }

        let mut devices = BTreeMap::new();
        for (address, dev) in config.device_map()? {
            devices.insert(address, Device::new(address, dev));
        }

        Ok(Fleet {
            global_address: config.global_address,
            devices,
            networks,
        })
    }

    /// The broadcast address shared by every device.
    pub fn global_address(&self) -> u8 {
        self.global_address
    }

    /// Look up a device by address.
    pub fn device(&self, address: u8) -> Option<&Device> {
        self.devices.get(&address)
    }

    /// Look up a network by id.
    pub fn network(&self, id: &str) -> Result<&Network, FleetError> {
        self.networks
            .get(id)
            .ok_or_else(|| FleetError::NoSuchNetwork(id.to_string()))
    }

    /// All devices, in address order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_protocol::HardwareModel;

    struct NullTransport;

    impl Transport for NullTransport {
        fn send(&mut self, _data: &[u8]) -> Result<(), FleetError> {
            Ok(())
        }
        fn receive(&mut self) -> Result<Vec<u8>, FleetError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn builds_devices_and_networks_from_config() {
        let config = FleetConfig::from_json(
            r#"{"Networks":{"office":{"ConnectionType":"485","Device":"/dev/ttyUSB0","BaudRate":9600}},
                "Devices":{
                  "1":{"DeviceType":"Busylight2","NetworkID":"office"},
                  "2":{"DeviceType":"Readerboard3_Monochrome","NetworkID":"office"}}}"#,
        )
        .unwrap();

        let fleet = Fleet::build(&config, |_, _| Ok(Box::new(NullTransport))).unwrap();
        assert_eq!(fleet.global_address(), 15);
        assert_eq!(fleet.devices().count(), 2);
        assert_eq!(
            fleet.device(2).unwrap().model,
            HardwareModel::Readerboard3Mono
        );
        assert!(fleet.device(3).is_none());
        assert!(fleet.network("office").is_ok());
        assert!(fleet.network("lobby").is_err());
    }

    #[test]
    fn build_rejects_invalid_config() {
        let config = FleetConfig {
            global_address: 99,
            networks: BTreeMap::new(),
            devices: BTreeMap::new(),
        };
        assert!(matches!(
            Fleet::build(&config, |_, _| Ok(Box::new(NullTransport))),
            Err(FleetError::GlobalAddressOutOfRange(99))
        ));
    }
}
