//! Protocol sessions over real loopback sockets

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use touch_relay::{
    hal::{MockInput, MockOutput, TcpCommandListener},
    RelayController,
};

type TcpRelay = RelayController<MockInput, MockOutput, TcpCommandListener>;

const MAX_TICKS: usize = 500;

fn relay() -> (TcpRelay, SocketAddr) {
    let listener = TcpCommandListener::bind_addr(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
    let addr = listener.local_addr().unwrap();
    (
        RelayController::new(0, MockInput::new(), MockOutput::new(), listener),
        addr,
    )
}

fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).unwrap();
    stream.set_nonblocking(true).unwrap();
    stream
}

fn tick_until(relay: &mut TcpRelay, mut done: impl FnMut(&TcpRelay) -> bool) {
    for _ in 0..MAX_TICKS {
        relay.tick();
        if done(relay) {
            return;
        }
        thread::sleep(Duration::from_millis(2));
    }
    panic!("condition not reached after {} ticks", MAX_TICKS);
}

/// Tick the relay while collecting bytes from `client` until a full reply
/// line arrives or `ticks` run out.
fn read_reply(relay: &mut TcpRelay, client: &mut TcpStream, ticks: usize) -> String {
    let mut reply = Vec::new();
    let mut buf = [0u8; 16];
    for _ in 0..ticks {
        relay.tick();
        match client.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                reply.extend_from_slice(&buf[..n]);
                if reply.ends_with(b"\n") {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => panic!("client read failed: {}", e),
        }
        thread::sleep(Duration::from_millis(2));
    }
    String::from_utf8(reply).unwrap()
}

fn exchange(relay: &mut TcpRelay, client: &mut TcpStream, line: &[u8]) -> String {
    client.write_all(line).unwrap();
    read_reply(relay, client, MAX_TICKS)
}

// ============================================================================
// Command Tests
// ============================================================================

#[test]
fn close_open_query() {
    let (mut relay, addr) = relay();
    let mut client = connect(addr);

    assert_eq!(exchange(&mut relay, &mut client, b"X1\n"), "true\n");
    assert!(relay.current_state());

    assert_eq!(exchange(&mut relay, &mut client, b"X0\n"), "false\n");
    assert!(!relay.current_state());

    assert_eq!(exchange(&mut relay, &mut client, b"X?\n"), "false\n");
}

#[test]
fn ignored_line_then_command() {
    let (mut relay, addr) = relay();
    let mut client = connect(addr);

    client.write_all(b"hello\n").unwrap();
    assert_eq!(read_reply(&mut relay, &mut client, 20), "");

    assert_eq!(exchange(&mut relay, &mut client, b"?1\n"), "true\n");
}

#[test]
fn pipelined_lines_answered_in_order() {
    let (mut relay, addr) = relay();
    let mut client = connect(addr);

    client.write_all(b"?1\n??\n?0\n").unwrap();
    let mut replies = String::new();
    for _ in 0..3 {
        replies.push_str(&read_reply(&mut relay, &mut client, MAX_TICKS));
    }
    assert_eq!(replies, "true\ntrue\nfalse\n");
}

// ============================================================================
// Session Tests
// ============================================================================

#[test]
fn second_client_waits_for_first() {
    let (mut relay, addr) = relay();
    let first = connect(addr);
    tick_until(&mut relay, |r| r.is_session_active());

    let mut second = connect(addr);
    second.write_all(b"?1\n").unwrap();
    assert_eq!(read_reply(&mut relay, &mut second, 20), "");
    assert!(!relay.current_state());

    drop(first);
    assert_eq!(read_reply(&mut relay, &mut second, MAX_TICKS), "true\n");
    assert!(relay.current_state());
}

#[test]
fn disconnect_frees_the_slot() {
    let (mut relay, addr) = relay();
    let client = connect(addr);
    tick_until(&mut relay, |r| r.is_session_active());

    drop(client);
    tick_until(&mut relay, |r| !r.is_session_active());
}

#[test]
fn unterminated_line_runs_at_disconnect() {
    let (mut relay, addr) = relay();
    let mut client = connect(addr);

    client.write_all(b"?1").unwrap();
    client.shutdown(Shutdown::Write).unwrap();
    tick_until(&mut relay, |r| r.current_state());
    tick_until(&mut relay, |r| !r.is_session_active());
}

#[test]
fn touch_works_while_client_idle() {
    let (mut relay, addr) = relay();
    let _client = connect(addr);
    tick_until(&mut relay, |r| r.is_session_active());

    relay.sensor_mut().input_mut().push_levels(&[true, false]);
    relay.tick();
    assert!(relay.current_state());
}
