//! ESP32-C3 SuperMini hardware abstraction layer for the touch relay board.
//!
//! This module provides hardware implementations for the ESP32-C3 SuperMini
//! driving two relay modules from two capacitive touch pads.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32-C3 SuperMini (RISC-V 160MHz, 4MB Flash)
//! - **Touch pads**: 2x TTP223 modules (push-pull output, HIGH while touched)
//! - **Relays**: 2x 3.3V-triggered relay modules (HIGH = coil energized)
//! - **Console**: UART1 on GPIO4/GPIO5; UART0 (GPIO21/20) carries the
//!   ESP-IDF boot and log output
//!
//! # Pin Assignments
//!
//! | GPIO | Use |
//! |------|-----|
//! | 0 | Touch pad, relay 0 |
//! | 1 | Touch pad, relay 1 |
//! | 4 | Console TX (UART1) |
//! | 5 | Console RX (UART1) |
//! | 6 | Relay 0 driver |
//! | 7 | Relay 1 driver |
//! | 20, 21 | UART0 RX/TX (log output) |
//!
//! GPIO2, 8, and 9 are strapping pins and are left free.

mod gpio;

pub use gpio::{Esp32Input, Esp32Output};

#[cfg(feature = "wifi")]
mod nvs;
#[cfg(feature = "wifi")]
pub use nvs::{Esp32NvsStorage, NvsStorageError};

#[cfg(feature = "wifi")]
mod wifi;
#[cfg(feature = "wifi")]
pub use wifi::Esp32Wifi;

mod uart;
pub use uart::Esp32Console;
