//! Desktop simulator for the touch relay board.
//!
//! Runs the same control loop as the firmware with simulated touch pads,
//! real TCP command ports, and a file standing in for the config region.
//! Commands are read from stdin:
//!
//! ```text
//! touch 0 | touch 1     Tap a touch pad
//! state                 Print both relay states
//! net ?                 Show link and stored config
//! net <ssid> <pass> <ip> <mask> <gateway>
//! quit
//! ```
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=debug cargo run --features sim --bin desktop_sim -- [config.bin]
//! # in another terminal
//! nc localhost 8000
//! ```

use std::io::BufRead;
use std::net::Ipv4Addr;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use log::info;
use touch_relay::config::RELAY_COUNT;
use touch_relay::console::ConsoleHandler;
use touch_relay::hal::{FileStorage, MockInput, MockLink, MockOutput, TcpCommandListener};
use touch_relay::storage::CONFIG_REGION_SIZE;
use touch_relay::traits::ByteStorage;
use touch_relay::{Config, ConfigSource, ConfigStore, RelayController};

const DEFAULT_STORAGE_PATH: &str = "touch-relay-config.bin";

type SimRelay = RelayController<MockInput, MockOutput, TcpCommandListener>;

fn relay(index: usize, port: u16) -> anyhow::Result<SimRelay> {
    let listener = TcpCommandListener::bind(port)?;
    println!("[OK] Relay {} listening on {}", index, listener.local_addr()?);
    Ok(RelayController::new(
        index,
        MockInput::new(),
        MockOutput::new(),
        listener,
    ))
}

fn spawn_stdin() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Handle simulator-only commands. Returns `false` for lines the console
/// should see instead.
fn sim_command(line: &str, relays: &mut [SimRelay]) -> bool {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some("touch"), Some(index)) => {
            match index.parse::<usize>().ok().and_then(|i| relays.get_mut(i)) {
                // HIGH for one tick, then released
                Some(relay) => relay.sensor_mut().input_mut().push_levels(&[true, false]),
                None => println!("no relay {}", index),
            }
            true
        }
        (Some("state"), None) => {
            for relay in relays.iter() {
                println!(
                    "relay {}: {}{}",
                    relay.index(),
                    if relay.current_state() { "closed" } else { "open" },
                    if relay.is_session_active() { " (client connected)" } else { "" }
                );
            }
            true
        }
        _ => false,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::default();
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_STORAGE_PATH.into());

    println!("touch-relay desktop simulator");
    println!();

    // Config region
    let storage = FileStorage::open(&path, CONFIG_REGION_SIZE)?;
    println!(
        "[OK] Config region: {} ({} bytes)",
        storage.path().display(),
        storage.capacity()
    );
    let mut store = ConfigStore::new(storage);
    let (net, source) = store.load_or_fallback();
    match source {
        ConfigSource::Stored => println!("[OK] Would join '{}'", net.ssid),
        ConfigSource::Fallback => println!("[WARN] No stored config, would join '{}'", net.ssid),
    }

    // Relays
    let mut relays: [SimRelay; RELAY_COUNT] = [
        relay(0, config.relays.ports[0])?,
        relay(1, config.relays.ports[1])?,
    ];

    let link = MockLink::connected(Ipv4Addr::LOCALHOST);
    let mut handler = ConsoleHandler::new(store);
    let stdin = spawn_stdin();

    println!();
    println!("Commands: touch <0|1>, state, net ?, net <ssid> <pass> <ip> <mask> <gw>, quit");
    println!();

    loop {
        for relay in relays.iter_mut() {
            let before = relay.current_state();
            relay.tick();
            if relay.current_state() != before {
                println!("relay {} -> {}", relay.index(), relay.current_state());
            }
        }

        match stdin.try_recv() {
            Ok(line) => {
                let line = line.trim();
                if line == "quit" || line == "exit" {
                    break;
                }
                if !sim_command(line, &mut relays) {
                    if let Some(reply) = handler.handle_line(line, &link) {
                        println!("{}", reply);
                    }
                }
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        thread::sleep(Duration::from_millis(u64::from(config.loop_interval_ms)));
    }

    info!("simulator stopped");
    Ok(())
}
