//! Integration tests for the provisioning console

use std::net::Ipv4Addr;

use touch_relay::{
    console::{ConsoleCommand, ConsoleHandler, LineAssembler},
    hal::{MockLink, MockStorage},
    storage::CONFIG_REGION_SIZE,
    ConfigStore, ConsoleError, NetworkConfig,
};

fn console() -> ConsoleHandler<MockStorage> {
    ConsoleHandler::new(ConfigStore::new(MockStorage::erased(CONFIG_REGION_SIZE)))
}

/// Feed raw bytes through a line assembler into the handler, collecting
/// every reply.
fn type_in(console: &mut ConsoleHandler<MockStorage>, link: &MockLink, bytes: &[u8]) -> Vec<String> {
    let mut input = LineAssembler::new();
    let mut replies = Vec::new();
    for b in bytes {
        match input.push(*b) {
            Some(Ok(line)) => replies.extend(console.handle_line(&line, link)),
            Some(Err(e)) => replies.push(e.to_string()),
            None => {}
        }
    }
    replies
}

// ============================================================================
// Provisioning Flow Tests
// ============================================================================

#[test]
fn provision_then_reboot_loads_new_config() {
    let mut console = console();
    let link = MockLink::disconnected();

    let replies = type_in(
        &mut console,
        &link,
        b"net workshop hunter22 192.168.1.50 255.255.255.0 192.168.1.1\r\n",
    );
    assert_eq!(replies.len(), 1);
    assert!(replies[0].ends_with("reboot to apply"));

    // Reboot: a new store over the saved bytes
    let bytes = console.store().storage().data.clone();
    let mut store = ConfigStore::new(MockStorage::from_bytes(bytes));
    let expected = NetworkConfig::new("workshop", "hunter22")
        .unwrap()
        .with_address(Ipv4Addr::new(192, 168, 1, 50))
        .with_netmask(Ipv4Addr::new(255, 255, 255, 0))
        .with_gateway(Ipv4Addr::new(192, 168, 1, 1));
    assert_eq!(store.load(), Some(expected));
}

#[test]
fn status_reflects_link_and_record() {
    let mut console = console();
    let link = MockLink::connected(Ipv4Addr::new(192, 168, 1, 50));

    let replies = type_in(&mut console, &link, b"net ?\n");
    assert!(replies[0].contains("joined, address 192.168.1.50"));
    assert!(replies[0].contains("stored: none"));

    type_in(&mut console, &link, b"net lab pw 0.0.0.0 0.0.0.0 0.0.0.0\n");
    let replies = type_in(&mut console, &link, b"net ?\n");
    assert!(replies[0].contains("stored: ssid 'lab' password 'pw', dhcp"));
}

#[test]
fn typo_corrected_with_backspace() {
    let mut console = console();
    let replies = type_in(&mut console, &MockLink::disconnected(), b"nex\x08t ?\r");
    assert!(replies[0].starts_with("link: not joined"));
}

// ============================================================================
// Rejection Tests
// ============================================================================

#[test]
fn malformed_lines_never_save() {
    let mut console = console();
    let link = MockLink::disconnected();

    let replies = type_in(
        &mut console,
        &link,
        b"net a b 1.2.3.4.5 255.0.0.0 1.1.1.1\n\
          net a b 1.2.3 255.0.0.0 1.1.1.1\n\
          net a b 1.2.3. 255.0.0.0 1.1.1.1\n\
          net a b 300.1.1.1 255.0.0.0 1.1.1.1\n\
          net a b\n\
          reboot\n",
    );
    assert_eq!(replies.len(), 6);
    for reply in &replies[..5] {
        assert!(reply.starts_with("format error"), "{}", reply);
    }
    assert_eq!(replies[5], "invalid command");
    assert_eq!(console.store().storage().writes, 0);
}

#[test]
fn nul_in_raw_line_is_rejected_without_saving() {
    let mut console = console();
    let link = MockLink::disconnected();

    // Raw lines reach the handler without a LineAssembler on the desktop
    let reply = console.handle_line("net lab\0x pw 10.0.0.2 255.0.0.0 10.0.0.1", &link);
    assert_eq!(reply, Some(ConsoleError::InvalidCharacter.to_string()));
    assert_eq!(console.store().storage().writes, 0);
    assert!(console.store().storage().data.iter().all(|b| *b == 0xFF));
}

#[test]
fn record_too_large_is_reported() {
    let mut console = console();
    let line = format!(
        "net {} {} 10.0.0.2 255.0.0.0 10.0.0.1\n",
        "s".repeat(32),
        "p".repeat(32)
    );
    let replies = type_in(&mut console, &MockLink::disconnected(), line.as_bytes());
    assert_eq!(replies, ["save failed: record needs 80 bytes, region holds 64"]);
}

#[test]
fn overlong_line_rejected() {
    let mut console = console();
    let mut bytes = vec![b'x'; 400];
    bytes.push(b'\n');
    let replies = type_in(&mut console, &MockLink::disconnected(), &bytes);
    assert_eq!(replies, [ConsoleError::LineTooLong.to_string()]);
}

#[test]
fn parse_is_usable_standalone() {
    assert_eq!(ConsoleCommand::parse("net ?"), Ok(ConsoleCommand::ShowNetwork));
    assert!(matches!(
        ConsoleCommand::parse("net a b 1.1.1.1 255.255.255.0 1.1.1.254"),
        Ok(ConsoleCommand::SetNetwork(_))
    ));
}
