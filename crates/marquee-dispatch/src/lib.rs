//! Marquee Dispatch Engine
//!
//! Turns "send this command to these devices" into wire traffic:
//! parses and resolves target lists, groups targets by network and
//! hardware model, encodes and frames once per group, and transmits
//! under each network's lock. Query verbs run one send/receive exchange
//! per device and hand back decoded status structures.
//!
//! Delivery failures are counted in the returned report rather than
//! aborting: a dead device or unplugged network must not keep a command
//! from its other targets.

mod engine;
mod error;
mod targets;

pub use engine::*;
pub use error::*;
pub use targets::*;
