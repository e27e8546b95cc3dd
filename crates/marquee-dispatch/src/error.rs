//! Dispatch error types.

use thiserror::Error;

use marquee_fleet::FleetError;
use marquee_protocol::ProtocolError;

/// Errors that stop a dispatch request outright.
///
/// Per-device and per-network failures during a send are counted in the
/// [`DispatchReport`] instead; only problems with the request itself
/// surface here.
///
/// [`DispatchReport`]: crate::engine::DispatchReport
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The request named no target devices at all.
    #[error("request missing device target address list")]
    MissingTargets,

    /// One or more target list entries were malformed. Every bad entry
    /// is reported, not just the first.
    #[error("invalid target list: {}", problems.join("; "))]
    InvalidTargets {
        /// One message per bad entry.
        problems: Vec<String>,
    },

    /// The command may not be sent to the global address.
    #[error("command may not be targeted to the global address")]
    GlobalNotAllowed,

    /// The command reads a reply and must go through a query cycle,
    /// not a broadcast send.
    #[error("command expects a reply; use a query cycle")]
    ExpectsReply,

    /// Every alternative in the all-lights-off fallback chain failed
    /// for a network.
    #[error("no way to turn lights off on network {network:?}")]
    AllLightsOffFailed {
        /// The network none of the alternatives could be framed for.
        network: String,
    },

    /// Fleet-level failure (unknown network, transport setup).
    #[error(transparent)]
    Fleet(#[from] FleetError),

    /// Wire protocol failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
