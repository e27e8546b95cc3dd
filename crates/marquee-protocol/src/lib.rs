//! Marquee Signage Wire Protocol
//!
//! This crate provides types and utilities for talking to LED readerboard
//! and busylight signage devices. Commands are short verb-byte payloads;
//! the same payload bytes work on a point-to-point USB serial link or an
//! RS-485 multidrop network, with link framing applied per network.
//!
//! # Protocol Overview
//!
//! Every command starts with a single verb byte (`T` for text, `L` for
//! lights, `Q` for a status query, and so on) followed by verb-specific
//! parameter bytes. Variable-length fields are self-terminated with `$`
//! or ESC. The `Q` and `?` verbs read a reply back from the device;
//! everything else is fire-and-forget.
//!
//! # Example
//!
//! ```rust,ignore
//! use marquee_protocol::{Command, HardwareModel, LedList, WireCommand};
//!
//! // Build a command payload for a particular hardware model
//! let cmd = Command::Light { leds: LedList::parse("R")? };
//! let wire = cmd.encode(HardwareModel::Busylight2)?;
//!
//! // Decode a device status reply
//! let status = marquee_protocol::decode_device_status(&received)?;
//! ```

mod caps;
mod commands;
mod constants;
mod error;
mod escape;
mod image;
mod params;
mod status;
mod types;

pub use commands::*;
pub use constants::*;
pub use error::*;
pub use escape::*;
pub use image::*;
pub use params::*;
pub use status::*;
pub use types::*;
