//! Shared configuration system for desktop and ESP32.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! Two kinds of configuration live here:
//!
//! - [`NetworkConfig`]: the network join parameters. Provisioned over the
//!   serial console and persisted by [`ConfigStore`](crate::storage::ConfigStore).
//! - [`Config`]: board-level settings fixed at build time (ports, loop rate).
//!
//! # Example
//!
//! ```rust
//! use core::net::Ipv4Addr;
//! use touch_relay::config::{Config, NetworkConfig, RelayConfig};
//!
//! // Board defaults: ports 8000/8001, 10ms loop
//! let config = Config::default();
//! assert_eq!(config.relays.ports, [8000, 8001]);
//!
//! // Static addressing on the workshop network
//! let net = NetworkConfig::new("workshop", "hunter22")
//!     .unwrap()
//!     .with_address(Ipv4Addr::new(192, 168, 1, 50))
//!     .with_netmask(Ipv4Addr::new(255, 255, 255, 0))
//!     .with_gateway(Ipv4Addr::new(192, 168, 1, 1));
//! assert!(!net.uses_dhcp());
//! assert_eq!(net.netmask_prefix(), 24);
//! ```

use core::net::Ipv4Addr;
use heapless::String as HString;

/// Number of relay channels on the board.
pub const RELAY_COUNT: usize = 2;

/// Maximum SSID length in bytes (802.11 limit).
pub const MAX_SSID_LEN: usize = 32;

/// Maximum password length in bytes (WPA2 passphrase limit is 63).
pub const MAX_PASSWORD_LEN: usize = 64;

/// Type alias for SSID strings
pub type SsidString = HString<MAX_SSID_LEN>;

/// Type alias for password strings
pub type PasswordString = HString<MAX_PASSWORD_LEN>;

/// SSID joined when no valid record is stored.
///
/// Override at build time with `RELAY_WIFI_SSID`.
pub const DEFAULT_SSID: &str = match option_env!("RELAY_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "touch-relay",
};

/// Password used together with [`DEFAULT_SSID`].
///
/// Override at build time with `RELAY_WIFI_PASSWORD`.
pub const DEFAULT_PASSWORD: &str = match option_env!("RELAY_WIFI_PASSWORD") {
    Some(password) => password,
    None => "touch-relay",
};

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Copy `s` into a bounded string, or `None` if it does not fit.
///
/// Unlike display strings, credentials are never truncated: a cut-off
/// password would join nothing.
pub fn bounded_string<const N: usize>(s: &str) -> Option<HString<N>> {
    let mut hs = HString::new();
    hs.push_str(s).ok()?;
    Some(hs)
}

// ============================================================================
// Network Config
// ============================================================================

/// Network join parameters.
///
/// A local address of `0.0.0.0` means "ask DHCP"; the netmask and gateway
/// are ignored in that case.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkConfig {
    /// Network SSID
    pub ssid: SsidString,
    /// Network password
    pub password: PasswordString,
    /// Static local address (`0.0.0.0` = DHCP)
    pub address: Ipv4Addr,
    /// Subnet mask for the static address
    pub netmask: Ipv4Addr,
    /// Default gateway for the static address
    pub gateway: Ipv4Addr,
}

impl NetworkConfig {
    /// Create a DHCP config for the given credentials.
    ///
    /// Returns `None` if either string is too long for its field or contains
    /// a NUL byte, which the stored record uses as its field terminator.
    pub fn new(ssid: &str, password: &str) -> Option<Self> {
        if ssid.contains('\0') || password.contains('\0') {
            return None;
        }
        Some(Self {
            ssid: bounded_string(ssid)?,
            password: bounded_string(password)?,
            address: Ipv4Addr::UNSPECIFIED,
            netmask: Ipv4Addr::UNSPECIFIED,
            gateway: Ipv4Addr::UNSPECIFIED,
        })
    }

    /// The documented default identity used when storage holds no valid
    /// record: [`DEFAULT_SSID`] / [`DEFAULT_PASSWORD`] with DHCP.
    pub fn fallback() -> Self {
        let mut ssid = SsidString::new();
        let mut password = PasswordString::new();
        // Build-time overrides longer than the field are cut rather than
        // failing the boot.
        for c in DEFAULT_SSID.chars() {
            if ssid.push(c).is_err() {
                break;
            }
        }
        for c in DEFAULT_PASSWORD.chars() {
            if password.push(c).is_err() {
                break;
            }
        }
        Self {
            ssid,
            password,
            address: Ipv4Addr::UNSPECIFIED,
            netmask: Ipv4Addr::UNSPECIFIED,
            gateway: Ipv4Addr::UNSPECIFIED,
        }
    }

    /// Set the static local address
    pub fn with_address(mut self, address: Ipv4Addr) -> Self {
        self.address = address;
        self
    }

    /// Set the subnet mask
    pub fn with_netmask(mut self, netmask: Ipv4Addr) -> Self {
        self.netmask = netmask;
        self
    }

    /// Set the default gateway
    pub fn with_gateway(mut self, gateway: Ipv4Addr) -> Self {
        self.gateway = gateway;
        self
    }

    /// Check if the address should come from DHCP
    pub fn uses_dhcp(&self) -> bool {
        self.address.is_unspecified()
    }

    /// Prefix length of the netmask (number of leading one bits).
    ///
    /// Non-contiguous masks count only the leading run.
    pub fn netmask_prefix(&self) -> u8 {
        u32::from(self.netmask).leading_ones() as u8
    }
}

// ============================================================================
// Relay Config
// ============================================================================

/// Relay channel configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayConfig {
    /// Command port per relay, indexed by relay number
    pub ports: [u16; RELAY_COUNT],
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ports: [8000, 8001],
        }
    }
}

impl RelayConfig {
    /// Set the command port for one relay.
    ///
    /// Out-of-range indices are ignored.
    pub fn with_port(mut self, index: usize, port: u16) -> Self {
        if let Some(slot) = self.ports.get_mut(index) {
            *slot = port;
        }
        self
    }
}

// ============================================================================
// Main Config
// ============================================================================

/// Board-level application configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Relay channel configuration
    pub relays: RelayConfig,
    /// Main loop idle interval in milliseconds
    pub loop_interval_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relays: RelayConfig::default(),
            loop_interval_ms: 10,
        }
    }
}

impl Config {
    /// Set relay configuration
    pub fn with_relays(mut self, relays: RelayConfig) -> Self {
        self.relays = relays;
        self
    }

    /// Set the loop interval
    pub fn with_loop_interval_ms(mut self, ms: u32) -> Self {
        self.loop_interval_ms = ms;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
