//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `tcp`: Non-blocking `std::net` listener (requires `std` feature)
//! - `file`: File-backed config region for the simulator (requires `std` feature)
//! - `esp32`: ESP32-C3 pins, NVS, Wi-Fi, and UART console (requires `esp32` feature)

pub mod mock;

#[cfg(feature = "std")]
pub mod file;
#[cfg(feature = "std")]
pub mod tcp;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "std")]
pub use file::FileStorage;
#[cfg(feature = "std")]
pub use tcp::{TcpCommandConnection, TcpCommandListener};

#[cfg(feature = "esp32")]
pub use esp32::*;
