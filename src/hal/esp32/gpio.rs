//! GPIO adapters for the touch pads and relay drivers.
//!
//! # Wiring
//!
//! - Touch module OUT → GPIO0 / GPIO1 (TTP223 push-pull, HIGH while touched)
//! - Relay module IN → GPIO6 / GPIO7 (HIGH energizes the coil)
//! - VCC → 3.3V
//! - GND → GND

use crate::traits::{DigitalInput, DigitalOutput};
use esp_idf_hal::gpio::{Input, InputPin, Output, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;

/// Touch pad input.
///
/// A pull-down keeps the pin LOW if the module is unplugged, so a missing
/// pad never reads as a permanent touch.
///
/// # Example
///
/// ```ignore
/// use touch_relay::hal::esp32::Esp32Input;
/// use touch_relay::EdgeSensor;
///
/// let peripherals = Peripherals::take()?;
/// let pad = Esp32Input::new(peripherals.pins.gpio0)?;
/// let mut sensor = EdgeSensor::new(pad);
/// ```
pub struct Esp32Input<'d, P>
where
    P: InputPin + OutputPin,
{
    pin: PinDriver<'d, P, Input>,
}

impl<'d, P> Esp32Input<'d, P>
where
    P: InputPin + OutputPin,
{
    /// Configure `pin` as a pulled-down input.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(pin: impl Peripheral<P = P> + 'd) -> Result<Self, EspError> {
        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(Pull::Down)?;
        Ok(Self { pin })
    }
}

impl<P> DigitalInput for Esp32Input<'_, P>
where
    P: InputPin + OutputPin,
{
    #[inline]
    fn is_high(&mut self) -> bool {
        self.pin.is_high()
    }
}

/// Relay driver output.
pub struct Esp32Output<'d, P>
where
    P: OutputPin,
{
    pin: PinDriver<'d, P, Output>,
}

impl<'d, P> Esp32Output<'d, P>
where
    P: OutputPin,
{
    /// Configure `pin` as an output and drive it LOW (relay open).
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(pin: impl Peripheral<P = P> + 'd) -> Result<Self, EspError> {
        let mut pin = PinDriver::output(pin)?;
        pin.set_low()?;
        Ok(Self { pin })
    }
}

impl<P> DigitalOutput for Esp32Output<'_, P>
where
    P: OutputPin,
{
    type Error = EspError;

    fn set_level(&mut self, high: bool) -> Result<(), EspError> {
        if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }
}
