//! Per-relay controller that ties the sensor, relay, and protocol together.
//!
//! This module provides [`RelayController`], the component the main loop
//! ticks once per iteration for each relay channel.
//!
//! # Tick Order
//!
//! Every [`tick`](RelayController::tick) runs two steps, always in this order:
//!
//! 1. **Sensor fusion**: `relay = sensor.poll() XOR relay`. A touch toggles
//!    the relay; no touch leaves it alone. This is the only automatic path.
//! 2. **Protocol service**: accept a peer if none is connected, then handle
//!    at most one command line without blocking.
//!
//! Neither step surfaces errors. A failed pin write is logged and retried on
//! the next touch or command; network failures just end the session.
//!
//! # Example
//!
//! ```rust
//! use touch_relay::RelayController;
//! use touch_relay::hal::{MockInput, MockListener, MockOutput};
//!
//! let mut pad = MockInput::new();
//! pad.push_levels(&[false, true, true, false]);
//!
//! let mut controller =
//!     RelayController::new(0, pad, MockOutput::new(), MockListener::new());
//!
//! controller.tick(); // LOW
//! assert!(!controller.current_state());
//! controller.tick(); // touch
//! assert!(controller.current_state());
//! controller.tick(); // still held
//! assert!(controller.current_state());
//! ```

use log::{info, warn};

use crate::protocol::{ControlProtocolServer, RelayCommand};
use crate::relay::RelayOutput;
use crate::sensor::EdgeSensor;
use crate::traits::{CommandListener, DigitalInput, DigitalOutput};

/// One relay channel.
///
/// Owns its sensor, relay, and listener for its whole lifetime. Dropping the
/// controller closes the listener and any open session.
///
/// # Type Parameters
///
/// - `I`: touch pad input ([`DigitalInput`])
/// - `O`: relay driver output ([`DigitalOutput`])
/// - `L`: command port listener ([`CommandListener`])
pub struct RelayController<I, O, L>
where
    I: DigitalInput,
    O: DigitalOutput,
    L: CommandListener,
{
    index: usize,
    sensor: EdgeSensor<I>,
    relay: RelayOutput<O>,
    server: ControlProtocolServer<L>,
}

impl<I, O, L> RelayController<I, O, L>
where
    I: DigitalInput,
    O: DigitalOutput,
    L: CommandListener,
{
    /// Create controller `index` from its pins and listener.
    pub fn new(index: usize, input: I, output: O, listener: L) -> Self {
        Self {
            index,
            sensor: EdgeSensor::new(input),
            relay: RelayOutput::new(output),
            server: ControlProtocolServer::new(index, listener),
        }
    }

    /// Run one control step. Never blocks.
    pub fn tick(&mut self) {
        let edge = self.sensor.poll();
        let next = edge ^ self.relay.get();
        if let Err(e) = self.relay.set(next) {
            warn!("relay {}: output write failed: {:?}", self.index, e);
        } else if edge {
            info!("relay {}: touch -> {}", self.index, next);
        }

        let index = self.index;
        let relay = &mut self.relay;
        self.server.service(|cmd| {
            if cmd != RelayCommand::Query {
                let target = cmd.apply_to(relay.get());
                if let Err(e) = relay.set(target) {
                    warn!("relay {}: output write failed: {:?}", index, e);
                }
            }
            relay.get()
        });
    }

    /// Current relay state (`true` = closed).
    #[inline]
    pub fn current_state(&self) -> bool {
        self.relay.get()
    }

    /// Relay index this controller was created with.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if a protocol peer is connected.
    pub fn is_session_active(&self) -> bool {
        self.server.is_session_active()
    }

    /// Access the touch sensor.
    pub fn sensor(&self) -> &EdgeSensor<I> {
        &self.sensor
    }

    /// Mutable access to the touch sensor (simulated inputs).
    pub fn sensor_mut(&mut self) -> &mut EdgeSensor<I> {
        &mut self.sensor
    }

    /// Access the relay output.
    pub fn relay(&self) -> &RelayOutput<O> {
        &self.relay
    }
}
