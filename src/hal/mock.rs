//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware, network, and storage
//! traits, enabling development and testing on desktop without a board.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockInput`] | [`DigitalInput`] | Scripted touch pad levels |
//! | [`MockOutput`] | [`DigitalOutput`] | Records relay pin writes |
//! | [`MockListener`] | [`CommandListener`] | Queued incoming sessions |
//! | [`MockConnection`] | [`CommandConnection`] | Scripted peer bytes, captured replies |
//! | [`MockStorage`] | [`ByteStorage`] | In-memory config region |
//! | [`MockLink`] | [`NetworkLink`] | Fixed join status |
//!
//! # Example
//!
//! ```rust
//! use touch_relay::RelayController;
//! use touch_relay::hal::{MockConnection, MockInput, MockListener, MockOutput};
//!
//! let mut listener = MockListener::new();
//! let conn = MockConnection::new().with_input(b"?1\n??\n");
//! let peer = conn.handle();
//! listener.queue_connection(conn);
//!
//! let mut relay = RelayController::new(0, MockInput::new(), MockOutput::new(), listener);
//! relay.tick();
//! relay.tick();
//!
//! assert!(relay.current_state());
//! assert_eq!(peer.output(), b"true\ntrue\n");
//! ```

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::net::Ipv4Addr;

use crate::traits::{
    ByteStorage, CommandConnection, CommandListener, DigitalInput, DigitalOutput, NetworkLink,
    ReadOutcome,
};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock digital input for testing.
///
/// Levels are returned in the order they were pushed. Once the queue runs
/// dry the last level is held, like a finger that stays on the pad.
///
/// # Example
///
/// ```rust
/// use touch_relay::hal::MockInput;
/// use touch_relay::traits::DigitalInput;
///
/// let mut pad = MockInput::new();
/// assert!(!pad.is_high());
///
/// pad.push_levels(&[true, false]);
/// assert!(pad.is_high());
/// assert!(!pad.is_high());
/// assert!(!pad.is_high()); // held
/// ```
#[derive(Debug, Default)]
pub struct MockInput {
    queue: VecDeque<bool>,
    level: bool,
    /// Number of times the pin was sampled.
    pub reads: usize,
}

impl MockInput {
    /// Creates a new mock input reading LOW.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue levels to be returned by successive reads.
    pub fn push_levels(&mut self, levels: &[bool]) {
        self.queue.extend(levels.iter().copied());
    }

    /// Drop any queued levels and hold `level` from now on.
    pub fn set_level(&mut self, level: bool) {
        self.queue.clear();
        self.level = level;
    }
}

impl DigitalInput for MockInput {
    fn is_high(&mut self) -> bool {
        if let Some(level) = self.queue.pop_front() {
            self.level = level;
        }
        self.reads += 1;
        self.level
    }
}

/// Mock digital output for testing.
///
/// Use the public fields to inspect the pin after test operations.
#[derive(Debug, Default)]
pub struct MockOutput {
    /// Last level successfully driven.
    pub level: bool,
    /// Number of successful writes.
    pub writes: usize,
    fail: bool,
}

impl MockOutput {
    /// Creates a new mock output driven LOW.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl DigitalOutput for MockOutput {
    type Error = ();

    fn set_level(&mut self, high: bool) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.level = high;
        self.writes += 1;
        Ok(())
    }
}

// ============================================================================
// Network Mocks
// ============================================================================

#[derive(Debug, Default)]
struct PeerState {
    input: VecDeque<u8>,
    output: Vec<u8>,
    disconnected: bool,
    closed: bool,
    fail_writes: bool,
}

/// Mock protocol session for testing.
///
/// The connection and its [`MockPeer`] handle share state, so a test can
/// keep feeding bytes and reading replies after the connection has been
/// handed to a listener.
///
/// # Example
///
/// ```rust
/// use touch_relay::hal::MockConnection;
/// use touch_relay::traits::{CommandConnection, ReadOutcome};
///
/// let mut conn = MockConnection::new().with_input(b"ab");
/// let peer = conn.handle();
///
/// let mut buf = [0u8; 8];
/// assert_eq!(conn.try_read(&mut buf), ReadOutcome::Data(2));
/// assert_eq!(conn.try_read(&mut buf), ReadOutcome::Pending);
///
/// conn.write_all(b"true\n").unwrap();
/// assert_eq!(peer.output(), b"true\n");
///
/// peer.disconnect();
/// assert_eq!(conn.try_read(&mut buf), ReadOutcome::Closed);
/// ```
#[derive(Debug, Default)]
pub struct MockConnection {
    state: Rc<RefCell<PeerState>>,
}

impl MockConnection {
    /// Creates a connected session with no pending input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes the peer has already sent.
    pub fn with_input(self, bytes: &[u8]) -> Self {
        self.state.borrow_mut().input.extend(bytes.iter().copied());
        self
    }

    /// Make every reply write fail.
    pub fn failing_writes(self) -> Self {
        self.state.borrow_mut().fail_writes = true;
        self
    }

    /// Get a handle for driving the peer side.
    pub fn handle(&self) -> MockPeer {
        MockPeer {
            state: Rc::clone(&self.state),
        }
    }
}

impl CommandConnection for MockConnection {
    type Error = ();

    fn try_read(&mut self, buf: &mut [u8]) -> ReadOutcome {
        let mut state = self.state.borrow_mut();
        if state.input.is_empty() {
            return if state.disconnected || state.closed {
                ReadOutcome::Closed
            } else {
                ReadOutcome::Pending
            };
        }

        let mut n = 0;
        while n < buf.len() {
            match state.input.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        ReadOutcome::Data(n)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes || state.closed {
            return Err(());
        }
        state.output.extend_from_slice(bytes);
        Ok(())
    }

    fn close(&mut self) {
        self.state.borrow_mut().closed = true;
    }
}

/// Peer side of a [`MockConnection`].
#[derive(Debug, Clone)]
pub struct MockPeer {
    state: Rc<RefCell<PeerState>>,
}

impl MockPeer {
    /// Everything the server has replied so far.
    pub fn output(&self) -> Vec<u8> {
        self.state.borrow().output.clone()
    }

    /// Send more bytes.
    pub fn push_input(&self, bytes: &[u8]) {
        self.state.borrow_mut().input.extend(bytes.iter().copied());
    }

    /// Hang up. Bytes already sent can still be read.
    pub fn disconnect(&self) {
        self.state.borrow_mut().disconnected = true;
    }

    /// Check if the server closed the connection.
    pub fn was_closed(&self) -> bool {
        self.state.borrow().closed
    }
}

/// Mock listener for testing.
///
/// Connections are accepted in the order they were queued.
#[derive(Debug, Default)]
pub struct MockListener {
    backlog: VecDeque<MockConnection>,
    /// Number of accept attempts.
    pub accept_calls: usize,
}

impl MockListener {
    /// Creates a listener with an empty backlog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to the accept backlog.
    pub fn queue_connection(&mut self, conn: MockConnection) {
        self.backlog.push_back(conn);
    }

    /// Number of connections still waiting to be accepted.
    pub fn pending(&self) -> usize {
        self.backlog.len()
    }
}

impl CommandListener for MockListener {
    type Connection = MockConnection;

    fn try_accept(&mut self) -> Option<MockConnection> {
        self.accept_calls += 1;
        self.backlog.pop_front()
    }
}

/// Mock network join status.
#[derive(Debug, Clone, Default)]
pub struct MockLink {
    /// Whether the link reports as joined.
    pub connected: bool,
    /// Address reported while joined.
    pub address: Option<Ipv4Addr>,
}

impl MockLink {
    /// A joined link with the given address.
    pub fn connected(address: Ipv4Addr) -> Self {
        Self {
            connected: true,
            address: Some(address),
        }
    }

    /// A link that is not joined.
    pub fn disconnected() -> Self {
        Self::default()
    }
}

impl NetworkLink for MockLink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn local_address(&self) -> Option<Ipv4Addr> {
        if self.connected {
            self.address
        } else {
            None
        }
    }
}

// ============================================================================
// Storage Mocks
// ============================================================================

/// Mock byte storage for testing.
///
/// # Example
///
/// ```rust
/// use touch_relay::hal::MockStorage;
/// use touch_relay::traits::ByteStorage;
///
/// let mut mem = MockStorage::erased(16);
/// mem.write(2, &[1, 2]).unwrap();
/// mem.commit().unwrap();
///
/// let mut buf = [0u8; 4];
/// mem.read(0, &mut buf).unwrap();
/// assert_eq!(buf, [0xFF, 0xFF, 1, 2]);
/// assert!(mem.write(15, &[0, 0]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MockStorage {
    /// Region contents.
    pub data: Vec<u8>,
    /// Number of successful writes.
    pub writes: usize,
    /// Number of successful commits.
    pub commits: usize,
    fail: bool,
}

impl MockStorage {
    /// A region of `capacity` bytes in the flash erased state (`0xFF`).
    pub fn erased(capacity: usize) -> Self {
        Self::from_bytes(alloc::vec![0xFF; capacity])
    }

    /// A region holding exactly `data`.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data,
            writes: 0,
            commits: 0,
            fail: false,
        }
    }

    /// Make every read, write, and commit fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn range(&self, offset: usize, len: usize) -> Result<core::ops::Range<usize>, ()> {
        if self.fail {
            return Err(());
        }
        let end = offset.checked_add(len).ok_or(())?;
        if end > self.data.len() {
            return Err(());
        }
        Ok(offset..end)
    }
}

impl ByteStorage for MockStorage {
    type Error = ();

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), ()> {
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), ()> {
        let range = self.range(offset, data.len())?;
        self.data[range].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.commits += 1;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
