//! Non-blocking TCP listener on top of `std::net`.
//!
//! Used by the desktop simulator and by the ESP32 binary (esp-idf provides
//! a BSD socket layer, so `std::net` works on the device too).
//!
//! # Example
//!
//! ```rust,no_run
//! use touch_relay::hal::TcpCommandListener;
//! use touch_relay::traits::CommandListener;
//!
//! let mut listener = TcpCommandListener::bind(8000)?;
//! // Returns immediately; None until a peer connects.
//! let _conn = listener.try_accept();
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpListener, TcpStream};

use log::{debug, warn};

use crate::traits::{CommandConnection, CommandListener, ReadOutcome};

/// A TCP port accepting protocol sessions without blocking.
pub struct TcpCommandListener {
    listener: TcpListener,
}

impl TcpCommandListener {
    /// Listen on `port` on all interfaces.
    ///
    /// Port `0` picks a free port; see [`local_addr`](Self::local_addr).
    pub fn bind(port: u16) -> io::Result<Self> {
        Self::bind_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
    }

    /// Listen on an explicit address.
    pub fn bind_addr(addr: SocketAddr) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        Ok(Self { listener })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl CommandListener for TcpCommandListener {
    type Connection = TcpCommandConnection;

    fn try_accept(&mut self) -> Option<TcpCommandConnection> {
        match self.listener.accept() {
            Ok((stream, peer)) => match TcpCommandConnection::new(stream) {
                Ok(conn) => {
                    debug!("accepted {}", peer);
                    Some(conn)
                }
                Err(e) => {
                    warn!("dropping {}: {}", peer, e);
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::WouldBlock => None,
            Err(e) => {
                warn!("accept failed: {}", e);
                None
            }
        }
    }
}

/// One accepted TCP session.
pub struct TcpCommandConnection {
    stream: TcpStream,
}

impl TcpCommandConnection {
    fn new(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }
}

impl CommandConnection for TcpCommandConnection {
    type Error = io::Error;

    fn try_read(&mut self, buf: &mut [u8]) -> ReadOutcome {
        match self.stream.read(buf) {
            Ok(0) => ReadOutcome::Closed,
            Ok(n) => ReadOutcome::Data(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => ReadOutcome::Pending,
            Err(e) if e.kind() == ErrorKind::Interrupted => ReadOutcome::Pending,
            Err(e) => {
                debug!("read failed: {}", e);
                ReadOutcome::Closed
            }
        }
    }

    /// Replies are a handful of bytes, so a full send buffer is treated as
    /// a failure rather than queued.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), io::Error> {
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }

    fn close(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
