//! Marquee Device Fleet
//!
//! State and transport layer for a fleet of signage devices: the JSON
//! configuration, per-device last-known LED state, and the serial
//! networks that carry command bytes to the hardware.
//!
//! A [`Fleet`] is built once from a [`FleetConfig`] and shared. Every
//! device owns a lock over its last-known state and every network owns
//! a lock over its transport, so callers on different networks never
//! contend.

mod config;
mod device;
mod driver;
mod error;
mod fleet;
mod network;

pub use config::*;
pub use device::*;
pub use driver::*;
pub use error::*;
pub use fleet::*;
pub use network::*;
