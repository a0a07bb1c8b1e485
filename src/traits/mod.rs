//! Trait definitions for hardware, network, and storage abstraction.
//!
//! This module defines the core abstractions that allow touch-relay to:
//! - Run on different hardware (ESP32, desktop mock)
//! - Serve the command protocol over any non-blocking socket layer
//! - Persist configuration in any byte-addressable storage
//!
//! # Submodules
//!
//! - `hardware`: Digital input (touch pad) and output (relay coil)
//! - `network`: Non-blocking listener/connection and join status
//! - `storage`: EEPROM-style byte region
//!
//! # Hardware Abstraction
//!
//! The key traits are:
//!
//! - [`DigitalInput`]: Raw touch sensor level
//! - [`DigitalOutput`]: Relay driver pin
//! - [`CommandListener`]: Accepts protocol sessions without blocking
//! - [`ByteStorage`]: Persistent config region

pub mod hardware;
pub mod network;
pub mod storage;

pub use hardware::*;
pub use network::*;
pub use storage::*;
