//! ESP32-C3 SuperMini touch relay controller.
//!
//! This is the main entry point for the physical board. At boot it:
//! - Loads the network config from NVS (or falls back to the built-in identity)
//! - Joins Wi-Fi with DHCP or the stored static address
//! - Opens one command port per relay (8000, 8001)
//!
//! Then it runs a 100Hz cooperative loop that:
//! - Ticks relay 0, then relay 1 (touch toggle + one protocol line each)
//! - Keeps the Wi-Fi link up
//! - Services the provisioning console
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features wifi --bin esp32_main
//!
//! # With a different fallback identity
//! RELAY_WIFI_SSID=workshop RELAY_WIFI_PASSWORD=hunter22 \
//!     cargo build --release --features wifi --bin esp32_main
//! ```

use esp_idf_hal::gpio::{AnyIOPin, IOPin};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::log::EspLogger;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use std::thread;
use std::time::Duration;
use touch_relay::console::ConsoleHandler;
use touch_relay::hal::esp32::{Esp32Console, Esp32Input, Esp32NvsStorage, Esp32Output, Esp32Wifi};
use touch_relay::hal::TcpCommandListener;
use touch_relay::storage::CONFIG_REGION_SIZE;
use touch_relay::{Config, ConfigSource, ConfigStore, RelayController};

type Relay = RelayController<
    Esp32Input<'static, AnyIOPin>,
    Esp32Output<'static, AnyIOPin>,
    TcpCommandListener,
>;

fn relay(index: usize, touch: AnyIOPin, coil: AnyIOPin, port: u16) -> anyhow::Result<Relay> {
    let input = Esp32Input::new(touch)?;
    let output = Esp32Output::new(coil)?;
    let listener = TcpCommandListener::bind(port)?;
    println!("[OK] Relay {} ready (port {})", index, port);
    Ok(RelayController::new(index, input, output, listener))
}

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    EspLogger::initialize_default();

    println!();
    println!("================================");
    println!("  touch-relay SuperMini");
    println!("================================");
    println!();

    let config = Config::default();
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // =========================================================================
    // Load Network Config (NVS)
    // =========================================================================
    let mut store = ConfigStore::new(Esp32NvsStorage::new(nvs.clone(), CONFIG_REGION_SIZE)?);
    let (net, source) = store.load_or_fallback();
    match source {
        ConfigSource::Stored => println!("[OK] Stored network config for '{}'", net.ssid),
        ConfigSource::Fallback => println!(
            "[WARN] No stored network config, using fallback '{}'",
            net.ssid
        ),
    }

    // =========================================================================
    // Initialize WiFi
    // =========================================================================
    let mut wifi = Esp32Wifi::new(peripherals.modem, sysloop, Some(nvs), &net)?;
    println!("[OK] WiFi started");

    // =========================================================================
    // Initialize Relays (touch GPIO0/1, coils GPIO6/7)
    // =========================================================================
    let pins = peripherals.pins;
    let mut relays = [
        relay(
            0,
            pins.gpio0.downgrade(),
            pins.gpio6.downgrade(),
            config.relays.ports[0],
        )?,
        relay(
            1,
            pins.gpio1.downgrade(),
            pins.gpio7.downgrade(),
            config.relays.ports[1],
        )?,
    ];

    // =========================================================================
    // Initialize Console (UART1 on GPIO4/5, UART0 keeps the log)
    // =========================================================================
    let mut console = Esp32Console::new(peripherals.uart1, pins.gpio4, pins.gpio5)?;
    let mut handler = ConsoleHandler::new(store);
    println!("[OK] Console ready on GPIO4/5 (115200 8N1)");

    println!();
    println!("Console commands:");
    println!("  net ?                                     Show link and stored config");
    println!("  net <ssid> <pass> <ip> <mask> <gateway>   Save config (0.0.0.0 = DHCP)");
    println!();
    println!("Starting control loop...");
    println!();

    // =========================================================================
    // Main Control Loop
    // =========================================================================
    loop {
        for relay in relays.iter_mut() {
            relay.tick();
        }

        wifi.ensure_connected();

        match console.poll_line() {
            Some(Ok(line)) => {
                if let Some(reply) = handler.handle_line(&line, &wifi) {
                    console.write_reply(&reply);
                }
            }
            Some(Err(e)) => console.write_reply(&e.to_string()),
            None => {}
        }

        // Sleep until next tick
        thread::sleep(Duration::from_millis(u64::from(config.loop_interval_ms)));
    }
}
