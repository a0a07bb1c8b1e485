//! Relay output with remembered state.
//!
//! The relay driver pin is write-only from the controller's point of view:
//! the commanded state is kept here and reads never touch hardware.
//!
//! `false` is open (coil released), `true` is closed (coil energized).

use crate::traits::DigitalOutput;

/// A relay driven by a [`DigitalOutput`].
///
/// # Example
///
/// ```rust
/// use touch_relay::RelayOutput;
/// use touch_relay::hal::MockOutput;
///
/// let mut relay = RelayOutput::new(MockOutput::new());
/// assert!(!relay.get());
///
/// relay.set(true).unwrap();
/// assert!(relay.get());
/// assert!(relay.output().level);
/// ```
pub struct RelayOutput<O: DigitalOutput> {
    output: O,
    state: bool,
}

impl<O: DigitalOutput> RelayOutput<O> {
    /// Wrap an output. The remembered state starts open (`false`).
    ///
    /// The pin is not driven until the first [`set`](Self::set); the
    /// platform adapter is expected to start LOW.
    pub fn new(output: O) -> Self {
        Self {
            output,
            state: false,
        }
    }

    /// Drive the relay and remember the new state.
    ///
    /// The state is only updated if the pin write succeeds.
    pub fn set(&mut self, state: bool) -> Result<(), O::Error> {
        self.output.set_level(state)?;
        self.state = state;
        Ok(())
    }

    /// Last commanded state.
    #[inline]
    pub fn get(&self) -> bool {
        self.state
    }

    /// Access the wrapped output.
    pub fn output(&self) -> &O {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockOutput;

    #[test]
    fn starts_open() {
        let relay = RelayOutput::new(MockOutput::new());
        assert!(!relay.get());
        assert_eq!(relay.output().writes, 0);
    }

    #[test]
    fn set_drives_and_stores() {
        let mut relay = RelayOutput::new(MockOutput::new());
        relay.set(true).unwrap();
        assert!(relay.get());
        assert!(relay.output().level);

        relay.set(false).unwrap();
        assert!(!relay.get());
        assert!(!relay.output().level);
    }

    #[test]
    fn set_is_idempotent() {
        let mut relay = RelayOutput::new(MockOutput::new());
        relay.set(true).unwrap();
        relay.set(true).unwrap();
        assert!(relay.get());
        assert!(relay.output().level);
        assert_eq!(relay.output().writes, 2);
    }

    #[test]
    fn failed_write_keeps_state() {
        let mut relay = RelayOutput::new(MockOutput::new().failing());
        assert!(relay.set(true).is_err());
        assert!(!relay.get());
    }
}
