//! Rising-edge detection for touch sensor inputs.
//!
//! A touch pad module holds its output HIGH for as long as a finger rests on
//! it. The relay should toggle once per touch, not once per tick, so the raw
//! level is turned into a one-shot pulse:
//!
//! ```text
//! level:  0 0 1 1 1 0 1 0
//! poll(): F F T F F F T F
//! ```
//!
//! # Example
//!
//! ```rust
//! use touch_relay::EdgeSensor;
//! use touch_relay::hal::MockInput;
//!
//! let mut pad = MockInput::new();
//! pad.push_levels(&[false, true, true, false, true]);
//! let mut sensor = EdgeSensor::new(pad);
//!
//! let pulses: Vec<bool> = (0..5).map(|_| sensor.poll()).collect();
//! assert_eq!(pulses, [false, true, false, false, true]);
//! ```

use crate::traits::DigitalInput;

/// One-shot rising-edge detector over a [`DigitalInput`].
///
/// The only state kept is the level seen on the previous poll. It starts
/// LOW, so a pad that is already HIGH on the very first poll reports one
/// edge.
pub struct EdgeSensor<I: DigitalInput> {
    input: I,
    last_level: bool,
}

impl<I: DigitalInput> EdgeSensor<I> {
    /// Wrap an input. The previous level starts LOW.
    pub fn new(input: I) -> Self {
        Self {
            input,
            last_level: false,
        }
    }

    /// Sample the input and report whether a LOW→HIGH transition happened
    /// since the previous call.
    pub fn poll(&mut self) -> bool {
        let level = self.input.is_high();
        let edge = level && !self.last_level;
        self.last_level = level;
        edge
    }

    /// Level seen on the most recent poll.
    #[inline]
    pub fn last_level(&self) -> bool {
        self.last_level
    }

    /// Access the wrapped input.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Mutable access to the wrapped input.
    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockInput;
    use alloc::vec::Vec;

    fn pulses(levels: &[bool]) -> Vec<bool> {
        let mut input = MockInput::new();
        input.push_levels(levels);
        let mut sensor = EdgeSensor::new(input);
        levels.iter().map(|_| sensor.poll()).collect()
    }

    #[test]
    fn sustained_high_fires_once() {
        assert_eq!(
            pulses(&[false, true, true, true, true]),
            [false, true, false, false, false]
        );
    }

    #[test]
    fn each_high_run_fires_once() {
        let levels = [true, false, true, true, false, false, true, false];
        let out = pulses(&levels);
        assert_eq!(out, [true, false, true, false, false, false, true, false]);

        // One pulse per maximal HIGH run
        let runs = levels
            .windows(2)
            .filter(|w| !w[0] && w[1])
            .count()
            + usize::from(levels[0]);
        assert_eq!(out.iter().filter(|p| **p).count(), runs);
    }

    #[test]
    fn high_at_startup_counts_as_edge() {
        assert_eq!(pulses(&[true, true]), [true, false]);
    }

    #[test]
    fn all_low_never_fires() {
        assert!(pulses(&[false; 16]).iter().all(|p| !p));
    }

    #[test]
    fn last_level_tracks_every_poll() {
        let mut input = MockInput::new();
        input.push_levels(&[true, false]);
        let mut sensor = EdgeSensor::new(input);
        assert!(!sensor.last_level());
        sensor.poll();
        assert!(sensor.last_level());
        sensor.poll();
        assert!(!sensor.last_level());
    }
}
