//! Hardware abstraction traits for the touch pads and relay coils.
//!
//! This module defines the digital pin interfaces that allow touch-relay to
//! work across different platforms (ESP32, desktop mocks, etc.).
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`DigitalInput`] | Binary level read (touch sensor output) |
//! | [`DigitalOutput`] | Binary level drive (relay coil driver) |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For ESP32 hardware, use the
//! implementations from `hal::esp32` (requires `esp32` feature).
//!
//! # Example
//!
//! ```rust
//! use touch_relay::traits::{DigitalInput, DigitalOutput};
//! use touch_relay::hal::{MockInput, MockOutput};
//!
//! let mut pad = MockInput::new();
//! pad.push_levels(&[true]);
//! assert!(pad.is_high());
//!
//! let mut coil = MockOutput::new();
//! coil.set_level(true).unwrap();
//! assert!(coil.level);
//! ```

/// Binary input trait - abstracts a digital GPIO read.
///
/// Touch sensor modules (TTP223 and similar) present a clean push-pull
/// level, so reads are treated as infallible and no debouncing is done here.
///
/// # Implementation Notes
///
/// - `is_high()` samples the pin once; it should be cheap and never block
/// - Implementations for active-low hardware should invert inside the adapter
///   so that `true` always means "touched"
pub trait DigitalInput {
    /// Returns `true` if the input currently reads HIGH.
    fn is_high(&mut self) -> bool;
}

/// Binary output trait - abstracts a digital GPIO drive.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use touch_relay::traits::DigitalOutput;
///
/// struct MyCoil { /* hardware handle */ }
///
/// impl DigitalOutput for MyCoil {
///     type Error = ();
///
///     fn set_level(&mut self, high: bool) -> Result<(), ()> {
///         // Write GPIO register...
///         Ok(())
///     }
/// }
/// ```
pub trait DigitalOutput {
    /// Error type for output operations.
    type Error: core::fmt::Debug;

    /// Drive the output HIGH (`true`) or LOW (`false`).
    ///
    /// Driving the same level twice must be harmless.
    fn set_level(&mut self, high: bool) -> Result<(), Self::Error>;
}
