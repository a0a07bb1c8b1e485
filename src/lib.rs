//! # touch-relay
//!
//! A two-channel relay controller. Each relay toggles on a touch pad and can
//! be forced open/closed or queried over its own TCP port. The network join
//! parameters are provisioned over a serial console and persisted in a small
//! non-volatile region.
//!
//! ## Features
//!
//! - **Touch toggling**: One toggle per touch, however long the finger rests
//! - **Line protocol**: `?0` / `?1` / `??` with a `true`/`false` reply
//! - **Non-blocking**: Every step is a single poll; one loop drives everything
//! - **Persisted config**: Fixed-layout record with a validity marker and a
//!   built-in fallback identity
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Pin, socket, and storage abstractions
//! - `sensor` - Rising-edge detection on the touch input
//! - `relay` - Relay output with remembered state
//! - `protocol` - Command parsing and the single-client line server
//! - `controller` - One relay channel: sensor, relay, and server together
//! - `storage` - Config record encoding and the config store
//! - `console` - Provisioning commands
//! - `hal` - Concrete implementations (mock for testing, TCP, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use touch_relay::RelayController;
//! use touch_relay::hal::{MockInput, MockListener, MockOutput};
//!
//! let mut pad = MockInput::new();
//! pad.push_levels(&[false, true]);
//!
//! let mut relays = [
//!     RelayController::new(0, MockInput::new(), MockOutput::new(), MockListener::new()),
//!     RelayController::new(1, pad, MockOutput::new(), MockListener::new()),
//! ];
//!
//! // Main loop: tick every relay, then sleep
//! for _ in 0..2 {
//!     for relay in relays.iter_mut() {
//!         relay.tick();
//!     }
//! }
//!
//! assert!(!relays[0].current_state());
//! assert!(relays[1].current_state());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Shared configuration system for desktop and ESP32.
pub mod config;
/// Serial provisioning console.
pub mod console;
/// Per-relay controller that ties the sensor, relay, and protocol together.
pub mod controller;
/// Error types.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Relay command protocol and server.
pub mod protocol;
/// Relay output with remembered state.
pub mod relay;
/// Touch sensor edge detection.
pub mod sensor;
/// Persisted network configuration.
pub mod storage;
/// Core traits for hardware, network, and storage abstraction.
pub mod traits;

// Re-exports for convenience
pub use controller::RelayController;
pub use protocol::{format_reply, ControlProtocolServer, RelayCommand};
pub use relay::RelayOutput;
pub use sensor::EdgeSensor;
pub use storage::{ConfigSource, ConfigStore};
pub use traits::{
    // Storage
    ByteStorage,
    // Network
    CommandConnection,
    CommandListener,
    // Hardware
    DigitalInput,
    DigitalOutput,
    NetworkLink,
    ReadOutcome,
};

// Config re-exports
pub use config::{Config, NetworkConfig, RelayConfig};

// Error re-exports
pub use error::{AddressFormatError, ConsoleError, RecordError, StorageError};
