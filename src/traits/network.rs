//! Network abstraction traits for the relay command listener.
//!
//! This module defines the socket-level interfaces the control protocol runs
//! on, plus a small status trait for the network join.
//!
//! # Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`CommandListener`] | Non-blocking accept on one TCP port |
//! | [`CommandConnection`] | Non-blocking byte read / reply write on one session |
//! | [`NetworkLink`] | Join status for the `net ?` console command |
//!
//! # Polling Model
//!
//! Nothing here may block. The main loop ticks every relay controller in turn,
//! so a silent peer on one port must never stall the other port or the
//! touch sensors:
//!
//! ```text
//! loop {
//!     relay[0].tick();   // try_accept / try_read, returns immediately
//!     relay[1].tick();
//!     console.poll();
//!     sleep(10ms);
//! }
//! ```

use core::net::Ipv4Addr;

/// Result of a single non-blocking read attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were copied into the buffer (`n > 0`).
    Data(usize),
    /// No bytes are available right now; try again next tick.
    Pending,
    /// The peer has closed the connection, or the socket failed.
    Closed,
}

/// A listening endpoint that hands out at most one connection per call.
///
/// # Implementation Notes
///
/// - `try_accept` must return immediately with `None` when no peer is waiting
/// - Accept errors should be logged and reported as `None`
/// - The listener keeps listening for its whole lifetime; dropping it closes
///   the port
pub trait CommandListener {
    /// Connection type handed out by this listener.
    type Connection: CommandConnection;

    /// Accept one pending connection without blocking.
    fn try_accept(&mut self) -> Option<Self::Connection>;
}

/// One accepted command session.
///
/// Dropping the connection closes it.
pub trait CommandConnection {
    /// Error type for write operations.
    type Error: core::fmt::Debug;

    /// Read whatever bytes are available without blocking.
    ///
    /// Read errors are reported as [`ReadOutcome::Closed`]; the session is
    /// over either way.
    fn try_read(&mut self, buf: &mut [u8]) -> ReadOutcome;

    /// Write the whole reply to the peer.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Close the connection explicitly.
    ///
    /// Default implementation does nothing and relies on drop.
    fn close(&mut self) {}
}

/// Network join status.
///
/// The join itself (association, DHCP or static addressing, reconnect) lives
/// in the platform adapter; the core only needs to report on it.
pub trait NetworkLink {
    /// Returns true if the device is currently joined.
    fn is_connected(&self) -> bool;

    /// Returns the current local address, if one has been assigned.
    fn local_address(&self) -> Option<Ipv4Addr>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestConnection {
        closed: bool,
    }

    impl CommandConnection for TestConnection {
        type Error = ();

        fn try_read(&mut self, _buf: &mut [u8]) -> ReadOutcome {
            ReadOutcome::Pending
        }

        fn write_all(&mut self, _bytes: &[u8]) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn close_default_impl_is_noop() {
        let mut conn = TestConnection { closed: false };
        conn.close();
        assert!(!conn.closed);
        let mut buf = [0u8; 4];
        assert_eq!(conn.try_read(&mut buf), ReadOutcome::Pending);
    }

    #[test]
    fn read_outcome_equality() {
        assert_eq!(ReadOutcome::Data(3), ReadOutcome::Data(3));
        assert_ne!(ReadOutcome::Data(3), ReadOutcome::Data(4));
        assert_ne!(ReadOutcome::Pending, ReadOutcome::Closed);
    }
}
