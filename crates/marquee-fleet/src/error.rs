//! Fleet error types.

use thiserror::Error;

use marquee_protocol::ProtocolError;

/// Errors from configuration loading, validation, or network I/O.
#[derive(Error, Debug)]
pub enum FleetError {
    /// Device map key is not a decimal address.
    #[error("device map key {0:?} is not a decimal device address")]
    BadAddressKey(String),

    /// Device address outside the 0-63 RS-485 band.
    #[error("device address {0} out of range [0,63]")]
    AddressOutOfRange(u8),

    /// Global address outside the 0-63 RS-485 band.
    #[error("global address {0} out of range [0,63]")]
    GlobalAddressOutOfRange(u8),

    /// A device claims the configured global address as its own.
    #[error("device address {0} collides with the global address")]
    GlobalAddressConflict(u8),

    /// Device names a network id that is not configured.
    #[error("device {device} is attached to unknown network {network:?}")]
    UnknownNetwork {
        /// Device address.
        device: u8,
        /// The missing network id.
        network: String,
    },

    /// Network id not present in the fleet.
    #[error("no such network {0:?}")]
    NoSuchNetwork(String),

    /// A frame was requested with no target devices.
    #[error("cannot frame a command for an empty target list")]
    EmptyTargetList,

    /// The network driver has no native all-lights-off broadcast.
    #[error("transport has no broadcast-off primitive")]
    BroadcastOffUnsupported,

    /// Device reply never arrived.
    #[error("timed out waiting for a reply")]
    ReplyTimeout,

    /// Wire protocol error while framing or decoding.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error on a transport.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
