//! WiFi connection management for ESP32-C3.
//!
//! Joins the network described by a [`NetworkConfig`] in station mode, with
//! either DHCP or a fixed IPv4 address, and keeps it joined.
//!
//! # Example
//!
//! ```ignore
//! use touch_relay::hal::esp32::Esp32Wifi;
//! use touch_relay::NetworkConfig;
//!
//! let config = NetworkConfig::new("MyNetwork", "secret123").unwrap();
//! let mut wifi = Esp32Wifi::new(modem, sysloop, Some(nvs), &config)?;
//!
//! loop {
//!     wifi.ensure_connected();
//!     // ...
//! }
//! ```

use crate::config::NetworkConfig;
use crate::traits::NetworkLink;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::ipv4;
use esp_idf_svc::netif::{EspNetif, NetifConfiguration, NetifStack};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{
    AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi, WifiDriver,
};
use log::{info, warn};
use std::net::Ipv4Addr;

/// Loop polls between reconnect attempts (about 5s at the default 10ms loop).
pub const RECONNECT_BACKOFF_POLLS: u32 = 500;

/// WiFi connection manager for ESP32.
///
/// Construction starts the driver and makes one blocking join attempt. If
/// that fails the device keeps running (touch control still works) and
/// [`ensure_connected`](Self::ensure_connected) keeps retrying.
pub struct Esp32Wifi<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
    backoff: u32,
    was_connected: bool,
}

impl<'a> Esp32Wifi<'a> {
    /// Create the station interface and try to join.
    ///
    /// This will:
    /// 1. Initialize the WiFi driver
    /// 2. Set up the station netif (fixed address unless `config` uses DHCP)
    /// 3. Configure station mode with the provided credentials
    /// 4. Connect and wait for the interface to come up
    ///
    /// # Errors
    ///
    /// Returns an error if driver or netif initialization fails. A failed
    /// join is only logged.
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &NetworkConfig,
    ) -> anyhow::Result<Self> {
        let driver = WifiDriver::new(modem, sysloop.clone(), nvs)?;
        let sta_netif = EspNetif::new_with_conf(&station_netif(config))?;
        let ap_netif = EspNetif::new(NetifStack::Ap)?;
        let esp_wifi = EspWifi::wrap_all(driver, sta_netif, ap_netif)?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        let auth_method = if config.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config.ssid.clone(),
            password: config.password.clone(),
            auth_method,
            ..Default::default()
        }))?;

        println!("[WiFi] Starting...");
        wifi.start()?;

        println!("[WiFi] Connecting to '{}'...", config.ssid);
        let joined = wifi.connect().and_then(|_| wifi.wait_netif_up());

        let mut this = Self {
            wifi,
            backoff: RECONNECT_BACKOFF_POLLS,
            was_connected: false,
        };

        match joined {
            Ok(()) => {
                this.was_connected = true;
                if let Some(ip) = this.local_address() {
                    println!("[WiFi] Connected! IP: {}", ip);
                }
            }
            Err(e) => warn!("wifi: join failed, will retry: {}", e),
        }

        Ok(this)
    }

    /// Keep the link up. Call once per loop iteration; never blocks.
    ///
    /// When the link is down a reconnect is started at most every
    /// [`RECONNECT_BACKOFF_POLLS`] calls. Returns the current link state.
    pub fn ensure_connected(&mut self) -> bool {
        let connected = self.is_connected();
        if connected {
            if !self.was_connected {
                info!("wifi: link up, address {:?}", self.local_address());
            }
            self.was_connected = true;
            self.backoff = 0;
            return true;
        }

        if self.was_connected {
            warn!("wifi: link lost");
            self.was_connected = false;
        }

        if self.backoff > 0 {
            self.backoff -= 1;
            return false;
        }
        self.backoff = RECONNECT_BACKOFF_POLLS;

        info!("wifi: reconnecting");
        // EspWifi::connect only starts the join; completion shows up later
        // through is_connected.
        if let Err(e) = self.wifi.wifi_mut().connect() {
            warn!("wifi: reconnect failed: {}", e);
        }
        false
    }
}

impl NetworkLink for Esp32Wifi<'_> {
    fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn local_address(&self) -> Option<Ipv4Addr> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip)
            .filter(|ip| !ip.is_unspecified())
    }
}

/// Station netif settings: DHCP, or a fixed address with no DNS.
fn station_netif(config: &NetworkConfig) -> NetifConfiguration {
    if config.uses_dhcp() {
        return NetifConfiguration::wifi_default_client();
    }

    println!(
        "[WiFi] Static address {}/{} via {}",
        config.address,
        config.netmask_prefix(),
        config.gateway
    );
    NetifConfiguration {
        ip_configuration: Some(ipv4::Configuration::Client(
            ipv4::ClientConfiguration::Fixed(ipv4::ClientSettings {
                ip: config.address,
                subnet: ipv4::Subnet {
                    gateway: config.gateway,
                    mask: ipv4::Mask(config.netmask_prefix()),
                },
                dns: None,
                secondary_dns: None,
            }),
        )),
        ..NetifConfiguration::wifi_default_client()
    }
}
