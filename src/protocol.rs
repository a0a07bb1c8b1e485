//! Line-based relay command protocol.
//!
//! Each relay listens on its own TCP port. A peer sends one command per
//! `\n`-terminated line; only the second character of the line matters:
//!
//! | Line | Effect | Reply |
//! |------|--------|-------|
//! | `?0` (any first char, `0` second) | open the relay | `false\n` |
//! | `?1` (any first char, `1` second) | close the relay | `true\n` |
//! | `??` (any first char, `?` second) | none | current state |
//! | anything else, or shorter than 2 chars | none | no reply |
//!
//! ```text
//! $ nc relay.local 8000
//! ?1
//! true
//! ??
//! true
//! ?0
//! false
//! ```
//!
//! # Sessions
//!
//! [`ControlProtocolServer`] serves one peer at a time. While a session is
//! open the listener is not polled, so a second client waits in the accept
//! backlog until the first disconnects. There is no idle timeout: a peer
//! that stays connected and silent keeps the slot.
//!
//! Every call to [`ControlProtocolServer::service`] is a single non-blocking
//! pass that dispatches at most one line.

use heapless::Vec as HVec;
use log::{debug, info, warn};

use crate::traits::{CommandConnection, CommandListener, ReadOutcome};

/// Bytes kept per line. Only two are significant; the rest are dropped.
pub const MAX_LINE_LEN: usize = 32;

/// Upper bound on bytes consumed from the socket in one pass, so a peer
/// streaming garbage without newlines cannot hold up the loop.
pub const MAX_BYTES_PER_PASS: usize = 256;

/// One assembled protocol line (possibly cut at [`MAX_LINE_LEN`]).
pub type Line = HVec<u8, MAX_LINE_LEN>;

// ============================================================================
// Commands
// ============================================================================

/// A recognised protocol command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayCommand {
    /// Force the relay open (`false`).
    Open,
    /// Force the relay closed (`true`).
    Close,
    /// Report the state without changing it.
    Query,
}

impl RelayCommand {
    /// Parse a line. Returns `None` for lines the protocol ignores.
    ///
    /// # Examples
    ///
    /// ```
    /// use touch_relay::RelayCommand;
    ///
    /// assert_eq!(RelayCommand::parse(b"?0"), Some(RelayCommand::Open));
    /// assert_eq!(RelayCommand::parse(b"X1 trailing"), Some(RelayCommand::Close));
    /// assert_eq!(RelayCommand::parse(b"??"), Some(RelayCommand::Query));
    /// assert_eq!(RelayCommand::parse(b"?"), None);
    /// assert_eq!(RelayCommand::parse(b"?x"), None);
    /// ```
    pub fn parse(line: &[u8]) -> Option<Self> {
        match line.get(1)? {
            b'0' => Some(RelayCommand::Open),
            b'1' => Some(RelayCommand::Close),
            b'?' => Some(RelayCommand::Query),
            _ => None,
        }
    }

    /// Apply the command to a relay state, returning the new state.
    #[inline]
    pub const fn apply_to(self, state: bool) -> bool {
        match self {
            RelayCommand::Open => false,
            RelayCommand::Close => true,
            RelayCommand::Query => state,
        }
    }
}

/// Reply text for a relay state, line break included.
#[inline]
pub const fn format_reply(state: bool) -> &'static str {
    if state {
        "true\n"
    } else {
        "false\n"
    }
}

// ============================================================================
// Session
// ============================================================================

/// Result of one pass over a session's input.
#[derive(Debug, PartialEq, Eq)]
enum LinePoll {
    /// A full line (or the unterminated tail left at disconnect).
    Line(Line),
    /// Nothing complete yet.
    Pending,
    /// Peer is gone and nothing is left to dispatch.
    Closed,
}

struct Session<C: CommandConnection> {
    conn: C,
    line: Line,
    overflowed: bool,
    peer_closed: bool,
}

impl<C: CommandConnection> Session<C> {
    fn new(conn: C) -> Self {
        Self {
            conn,
            line: Line::new(),
            overflowed: false,
            peer_closed: false,
        }
    }

    fn take_line(&mut self) -> Line {
        self.overflowed = false;
        core::mem::take(&mut self.line)
    }

    fn has_partial(&self) -> bool {
        !self.line.is_empty() || self.overflowed
    }

    /// Read byte-by-byte until a newline, no data, or the pass budget is
    /// spent. Bytes after the first line stay in the socket for later ticks.
    fn poll_line(&mut self) -> LinePoll {
        if self.peer_closed {
            return if self.has_partial() {
                LinePoll::Line(self.take_line())
            } else {
                LinePoll::Closed
            };
        }

        let mut byte = [0u8; 1];
        for _ in 0..MAX_BYTES_PER_PASS {
            match self.conn.try_read(&mut byte) {
                ReadOutcome::Data(_) => {
                    if byte[0] == b'\n' {
                        return LinePoll::Line(self.take_line());
                    }
                    if self.line.push(byte[0]).is_err() {
                        self.overflowed = true;
                    }
                }
                ReadOutcome::Pending => return LinePoll::Pending,
                ReadOutcome::Closed => {
                    self.peer_closed = true;
                    // An unterminated last line still counts.
                    return if self.has_partial() {
                        LinePoll::Line(self.take_line())
                    } else {
                        LinePoll::Closed
                    };
                }
            }
        }
        LinePoll::Pending
    }
}

// ============================================================================
// Server
// ============================================================================

/// Single-client protocol server for one relay.
///
/// # Example
///
/// ```rust
/// use touch_relay::{ControlProtocolServer, RelayCommand};
/// use touch_relay::hal::{MockConnection, MockListener};
///
/// let mut listener = MockListener::new();
/// let conn = MockConnection::new().with_input(b"?1\n");
/// let peer = conn.handle();
/// listener.queue_connection(conn);
///
/// let mut server = ControlProtocolServer::new(0, listener);
/// let mut relay = false;
/// let cmd = server.service(|cmd| {
///     relay = cmd.apply_to(relay);
///     relay
/// });
///
/// assert_eq!(cmd, Some(RelayCommand::Close));
/// assert!(relay);
/// assert_eq!(peer.output(), b"true\n");
/// ```
pub struct ControlProtocolServer<L: CommandListener> {
    index: usize,
    listener: L,
    session: Option<Session<L::Connection>>,
}

impl<L: CommandListener> ControlProtocolServer<L> {
    /// Create a server for relay `index` on an already-bound listener.
    pub fn new(index: usize, listener: L) -> Self {
        Self {
            index,
            listener,
            session: None,
        }
    }

    /// Run one non-blocking pass.
    ///
    /// Accepts a peer if none is connected, then dispatches at most one
    /// line. `apply` is called with the parsed command and must return the
    /// relay state after applying it; that state is sent back as the reply.
    ///
    /// Returns the dispatched command, if any. I/O failures end the session
    /// and are never surfaced.
    pub fn service<F>(&mut self, apply: F) -> Option<RelayCommand>
    where
        F: FnOnce(RelayCommand) -> bool,
    {
        if self.session.is_none() {
            if let Some(conn) = self.listener.try_accept() {
                info!("relay {}: session opened", self.index);
                self.session = Some(Session::new(conn));
            }
        }

        let session = self.session.as_mut()?;
        let line = match session.poll_line() {
            LinePoll::Line(line) => line,
            LinePoll::Pending => return None,
            LinePoll::Closed => {
                self.close_session();
                return None;
            }
        };

        let Some(cmd) = RelayCommand::parse(&line) else {
            debug!("relay {}: ignoring line {:?}", self.index, line.as_slice());
            return None;
        };

        let state = apply(cmd);
        debug!("relay {}: {:?} -> {}", self.index, cmd, state);

        if let Err(e) = session.conn.write_all(format_reply(state).as_bytes()) {
            warn!("relay {}: reply failed: {:?}", self.index, e);
            self.close_session();
        }
        Some(cmd)
    }

    /// Check if a peer is currently connected.
    pub fn is_session_active(&self) -> bool {
        self.session.is_some()
    }

    /// Access the listener.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.conn.close();
            info!("relay {}: session closed", self.index);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
