//! Provisioning console on a UART.
//!
//! # Wiring
//!
//! - UART1, TX → GPIO4, RX → GPIO5
//! - 115200 8N1
//!
//! GPIO21/GPIO20 are UART0's TX/RX and stay with the ESP-IDF log output.

use crate::console::{LineAssembler, CONSOLE_LINE_LEN};
use crate::error::ConsoleError;
use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::gpio::{AnyIOPin, InputPin, OutputPin};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;
use esp_idf_hal::uart::{config::Config, Uart, UartDriver};
use esp_idf_hal::units::Hertz;
use heapless::String as HString;
use log::warn;

/// Console baud rate.
pub const CONSOLE_BAUD: u32 = 115_200;

/// Non-blocking line source and reply sink on a UART.
///
/// # Example
///
/// ```ignore
/// use touch_relay::hal::esp32::Esp32Console;
///
/// let mut console = Esp32Console::new(
///     peripherals.uart1,
///     peripherals.pins.gpio4,
///     peripherals.pins.gpio5,
/// )?;
///
/// loop {
///     if let Some(Ok(line)) = console.poll_line() {
///         console.write_reply(&line);
///     }
/// }
/// ```
pub struct Esp32Console<'d> {
    uart: UartDriver<'d>,
    input: LineAssembler,
}

impl<'d> Esp32Console<'d> {
    /// Set up the UART at [`CONSOLE_BAUD`].
    ///
    /// # Errors
    ///
    /// Returns an error if the UART driver cannot be installed.
    pub fn new<U: Uart>(
        uart: impl Peripheral<P = U> + 'd,
        tx: impl Peripheral<P = impl OutputPin> + 'd,
        rx: impl Peripheral<P = impl InputPin> + 'd,
    ) -> Result<Self, EspError> {
        let config = Config::default().baudrate(Hertz(CONSOLE_BAUD));
        let uart = UartDriver::new(
            uart,
            tx,
            rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &config,
        )?;
        Ok(Self {
            uart,
            input: LineAssembler::new(),
        })
    }

    /// Drain received bytes until a line completes or the FIFO is empty.
    ///
    /// Characters are echoed so the operator sees what they type.
    pub fn poll_line(&mut self) -> Option<Result<HString<CONSOLE_LINE_LEN>, ConsoleError>> {
        let mut byte = [0u8; 1];
        loop {
            match self.uart.read(&mut byte, NON_BLOCK) {
                Ok(1) => {
                    self.echo(byte[0]);
                    if let Some(line) = self.input.push(byte[0]) {
                        return Some(line);
                    }
                }
                Ok(_) => return None,
                Err(e) => {
                    warn!("console: uart read failed: {}", e);
                    return None;
                }
            }
        }
    }

    /// Write a reply followed by a line break.
    pub fn write_reply(&mut self, text: &str) {
        for line in text.lines() {
            self.write_raw(line.as_bytes());
            self.write_raw(b"\r\n");
        }
    }

    fn echo(&mut self, byte: u8) {
        match byte {
            b'\r' | b'\n' => self.write_raw(b"\r\n"),
            0x08 | 0x7f => self.write_raw(b"\x08 \x08"),
            0x20..=0x7e => self.write_raw(&[byte]),
            _ => {}
        }
    }

    fn write_raw(&mut self, bytes: &[u8]) {
        if let Err(e) = self.uart.write(bytes) {
            warn!("console: uart write failed: {}", e);
        }
    }
}
