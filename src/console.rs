//! Provisioning console.
//!
//! A line-oriented command interface on the serial port, used only to view
//! and change the network config. Two commands exist:
//!
//! ```text
//! net ?
//! net <ssid> <password> <address> <netmask> <gateway>
//! ```
//!
//! Arguments are separated by whitespace, so SSIDs and passwords containing
//! spaces cannot be entered here. A new config is persisted immediately and
//! takes effect on the next boot.
//!
//! # Example
//!
//! ```rust
//! use core::net::Ipv4Addr;
//! use touch_relay::console::ConsoleHandler;
//! use touch_relay::hal::{MockLink, MockStorage};
//! use touch_relay::storage::ConfigStore;
//!
//! let mut console = ConsoleHandler::new(ConfigStore::new(MockStorage::erased(64)));
//! let link = MockLink::connected(Ipv4Addr::new(10, 0, 0, 7));
//!
//! let reply = console
//!     .handle_line("net shop secret 10.0.0.50 255.255.255.0 10.0.0.1", &link)
//!     .unwrap();
//! assert!(reply.contains("reboot to apply"));
//!
//! let reply = console.handle_line("reboot", &link).unwrap();
//! assert_eq!(reply, "invalid command");
//! ```

use alloc::string::{String, ToString};
use core::fmt::Write;
use core::net::Ipv4Addr;

use heapless::String as HString;
use log::{info, warn};

use crate::config::NetworkConfig;
use crate::error::{AddressFormatError, ConsoleError};
use crate::storage::ConfigStore;
use crate::traits::{ByteStorage, NetworkLink};

/// Longest console line accepted, in bytes.
pub const CONSOLE_LINE_LEN: usize = 160;

// ============================================================================
// Dotted-quad parsing
// ============================================================================

/// Parse a strict dotted-quad IPv4 address.
///
/// Exactly three `.` separators and four decimal fields of 1-3 digits, each
/// at most 255. No whitespace, signs, or empty fields.
///
/// ```
/// use core::net::Ipv4Addr;
/// use touch_relay::console::parse_dotted_quad;
/// use touch_relay::AddressFormatError;
///
/// assert_eq!(parse_dotted_quad("10.0.0.1"), Ok(Ipv4Addr::new(10, 0, 0, 1)));
/// assert_eq!(
///     parse_dotted_quad("10.0.0.1."),
///     Err(AddressFormatError::SeparatorCount { found: 4 })
/// );
/// ```
pub fn parse_dotted_quad(s: &str) -> Result<Ipv4Addr, AddressFormatError> {
    let found = s.bytes().filter(|b| *b == b'.').count();
    if found != 3 {
        return Err(AddressFormatError::SeparatorCount { found });
    }

    let mut octets = [0u8; 4];
    for (index, field) in s.split('.').enumerate() {
        if field.is_empty() || field.len() > 3 || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddressFormatError::InvalidOctet { index });
        }
        octets[index] = field
            .parse()
            .map_err(|_| AddressFormatError::InvalidOctet { index })?;
    }
    Ok(Ipv4Addr::from(octets))
}

// ============================================================================
// Commands
// ============================================================================

/// A parsed console command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `net ?`: print link status and the stored config.
    ShowNetwork,
    /// `net <ssid> <password> <address> <netmask> <gateway>`: save a new config.
    SetNetwork(NetworkConfig),
}

impl ConsoleCommand {
    /// Parse one console line.
    pub fn parse(line: &str) -> Result<Self, ConsoleError> {
        let mut words = line.split_whitespace();
        if words.next() != Some("net") {
            return Err(ConsoleError::InvalidCommand);
        }

        let mut args: [&str; 5] = [""; 5];
        let mut count = 0;
        for word in words {
            if count == args.len() {
                return Err(ConsoleError::Malformed);
            }
            args[count] = word;
            count += 1;
        }

        match count {
            1 if args[0] == "?" => Ok(ConsoleCommand::ShowNetwork),
            5 => {
                let [ssid, password, address, netmask, gateway] = args;
                if ssid.contains('\0') || password.contains('\0') {
                    return Err(ConsoleError::InvalidCharacter);
                }
                let config = NetworkConfig::new(ssid, password)
                    .ok_or(ConsoleError::FieldTooLong)?
                    .with_address(parse_dotted_quad(address)?)
                    .with_netmask(parse_dotted_quad(netmask)?)
                    .with_gateway(parse_dotted_quad(gateway)?);
                Ok(ConsoleCommand::SetNetwork(config))
            }
            _ => Err(ConsoleError::Malformed),
        }
    }
}

// ============================================================================
// Handler
// ============================================================================

/// Executes console commands against the config store.
pub struct ConsoleHandler<S: ByteStorage> {
    store: ConfigStore<S>,
}

impl<S: ByteStorage> ConsoleHandler<S> {
    /// Create a handler that owns the config store.
    pub fn new(store: ConfigStore<S>) -> Self {
        Self { store }
    }

    /// Handle one raw line and return the text to show the operator.
    ///
    /// Blank lines produce no output. Errors are rendered as text; nothing
    /// is saved when a line is rejected.
    pub fn handle_line<N: NetworkLink>(&mut self, line: &str, link: &N) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }
        let reply = match ConsoleCommand::parse(line) {
            Ok(cmd) => self.execute(cmd, link),
            Err(e) => Err(e),
        };
        Some(reply.unwrap_or_else(|e| {
            warn!("console: {}", e);
            e.to_string()
        }))
    }

    /// Execute a parsed command.
    pub fn execute<N: NetworkLink>(
        &mut self,
        cmd: ConsoleCommand,
        link: &N,
    ) -> Result<String, ConsoleError> {
        match cmd {
            ConsoleCommand::ShowNetwork => Ok(self.status(link)),
            ConsoleCommand::SetNetwork(config) => {
                self.store.save(&config)?;
                info!("console: new network config for '{}'", config.ssid);
                let mut out = String::new();
                let _ = write!(out, "saved network '{}'", config.ssid);
                write_addressing(&mut out, &config);
                out.push_str("\nreboot to apply");
                Ok(out)
            }
        }
    }

    fn status<N: NetworkLink>(&mut self, link: &N) -> String {
        let mut out = String::new();
        match (link.is_connected(), link.local_address()) {
            (true, Some(addr)) => {
                let _ = write!(out, "link: joined, address {}", addr);
            }
            (true, None) => out.push_str("link: joined, no address"),
            (false, _) => out.push_str("link: not joined"),
        }

        match self.store.load() {
            Some(config) => {
                let _ = write!(
                    out,
                    "\nstored: ssid '{}' password '{}'",
                    config.ssid, config.password
                );
                write_addressing(&mut out, &config);
            }
            None => {
                let fallback = NetworkConfig::fallback();
                let _ = write!(out, "\nstored: none (fallback ssid '{}')", fallback.ssid);
            }
        }
        out
    }

    /// Access the config store.
    pub fn store(&self) -> &ConfigStore<S> {
        &self.store
    }
}

fn write_addressing(out: &mut String, config: &NetworkConfig) {
    if config.uses_dhcp() {
        out.push_str(", dhcp");
    } else {
        let _ = write!(
            out,
            ", address {} netmask {} gateway {}",
            config.address, config.netmask, config.gateway
        );
    }
}

// ============================================================================
// Line assembly
// ============================================================================

/// Assembles console lines from a raw byte stream (UART, stdin).
///
/// - `\r` or `\n` ends a line; empty lines are skipped
/// - backspace (`0x08`) and delete (`0x7f`) remove the last character
/// - other control bytes and non-ASCII bytes are dropped
/// - a line longer than [`CONSOLE_LINE_LEN`] is discarded whole and reported
///   as [`ConsoleError::LineTooLong`] when it ends
///
/// ```
/// use touch_relay::console::LineAssembler;
///
/// let mut input = LineAssembler::new();
/// let mut lines = Vec::new();
/// for b in b"net ?x\x08\r\n" {
///     if let Some(line) = input.push(*b) {
///         lines.push(line.unwrap());
///     }
/// }
/// assert_eq!(lines.len(), 1);
/// assert_eq!(lines[0].as_str(), "net ?");
/// ```
#[derive(Debug, Default)]
pub struct LineAssembler {
    line: HString<CONSOLE_LINE_LEN>,
    overflowed: bool,
}

impl LineAssembler {
    /// Create an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns a result when a non-empty line ends.
    pub fn push(&mut self, byte: u8) -> Option<Result<HString<CONSOLE_LINE_LEN>, ConsoleError>> {
        match byte {
            b'\r' | b'\n' => {
                if self.overflowed {
                    self.overflowed = false;
                    self.line.clear();
                    return Some(Err(ConsoleError::LineTooLong));
                }
                if self.line.is_empty() {
                    return None;
                }
                Some(Ok(core::mem::take(&mut self.line)))
            }
            0x08 | 0x7f => {
                if !self.overflowed {
                    self.line.pop();
                }
                None
            }
            0x20..=0x7e => {
                if self.line.push(byte as char).is_err() {
                    self.overflowed = true;
                }
                None
            }
            _ => None,
        }
    }

    /// Current partial line.
    pub fn pending(&self) -> &str {
        &self.line
    }
}

// ============================================================================
// Tests
// ============================================================================
