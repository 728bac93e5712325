//! End-to-end Server Tests
//!
//! Runs a real server on a loopback port and talks to it with the client
//! and with raw sockets.

use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hftp::protocol::Status;
use hftp::client::MAX_RESPONSE_LINE;
use hftp::network::AdmissionController;
use hftp::{Client, Config, HftpError, Server};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn start_server(dir: &Path, max_connections: usize) -> SocketAddr {
    let config = Config::builder()
        .served_dir(dir)
        .listen_addr("127.0.0.1:0")
        .max_connections(max_connections)
        .build();
    let server = Server::bind(config).unwrap();
    let addr = server.local_addr().unwrap();
    server.spawn().unwrap();
    addr
}

fn setup() -> (TempDir, SocketAddr) {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), b"abcd").unwrap();
    let addr = start_server(temp_dir.path(), 4);
    (temp_dir, addr)
}

/// Write `request`, then read until the server closes the socket
fn exchange_until_close(addr: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.write_all(request).unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// Poll until `controller` has `expected` slots in use
fn wait_for_in_use(controller: &AdmissionController, expected: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while controller.in_use() != expected {
        assert!(
            Instant::now() < deadline,
            "in_use stuck at {}, expected {}",
            controller.in_use(),
            expected
        );
        thread::sleep(Duration::from_millis(10));
    }
}

/// Read from `stream` until `expected` bytes have arrived
fn read_exactly(stream: &mut TcpStream, expected: usize) -> String {
    let mut out = vec![0u8; expected];
    stream.read_exact(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_example_session() {
    let (_temp_dir, addr) = setup();
    let mut client = Client::connect(addr).unwrap();

    assert_eq!(client.slice("a.txt", 1, 2).unwrap(), b"bc");
    assert_eq!(client.metadata("a.txt").unwrap(), 4);

    match client.metadata("missing.txt") {
        Err(HftpError::Server { status, .. }) => assert_eq!(status, Status::FileNotFound),
        other => panic!("Expected FILE_NOT_FOUND, got {:?}", other),
    }

    client.send_raw(b"bogus_verb\r\n").unwrap();
    assert_eq!(client.read_status().unwrap().status, Status::InvalidCommand);

    client.send_raw(b"get_metadata a.txt extra\r\n").unwrap();
    assert_eq!(client.read_status().unwrap().status, Status::InvalidArguments);

    // Session survived every recoverable error
    assert_eq!(client.metadata("a.txt").unwrap(), 4);
    client.quit().unwrap();
}

#[test]
fn test_listing_over_the_wire() {
    let (temp_dir, addr) = setup();
    fs::write(temp_dir.path().join("b.bin"), b"\x00\x01").unwrap();

    let mut client = Client::connect(addr).unwrap();
    let names: HashSet<String> = client.file_listing().unwrap().into_iter().collect();
    let expected: HashSet<String> = ["a.txt", "b.bin"].iter().map(|s| s.to_string()).collect();
    assert_eq!(names, expected);
}

#[test]
fn test_large_slice_over_the_wire() {
    let (temp_dir, addr) = setup();
    let data: Vec<u8> = (0..300_000u32).map(|i| (i.wrapping_mul(7919) >> 3) as u8).collect();
    fs::write(temp_dir.path().join("big.bin"), &data).unwrap();

    // Encoded payload is far longer than any ordinary response line
    assert!(data.len() * 4 / 3 > MAX_RESPONSE_LINE);

    let mut client = Client::connect(addr).unwrap();
    assert_eq!(client.metadata("big.bin").unwrap(), data.len() as u64);
    assert_eq!(client.slice("big.bin", 0, 300_000).unwrap(), data);
    assert_eq!(client.slice("big.bin", 1234, 99_999).unwrap(), &data[1234..1234 + 99_999]);
}

#[test]
fn test_bad_offset_streams_nothing() {
    let (_temp_dir, addr) = setup();
    let out = exchange_until_close(addr, b"get_slice a.txt 2 3\r\nquit\r\n");
    assert_eq!(out, "203 OFFSET EXCEEDS FILE SIZE\r\n0 OK\r\n");
}

#[test]
fn test_traversal_over_the_wire() {
    let temp_dir = TempDir::new().unwrap();
    let served = temp_dir.path().join("served");
    fs::create_dir(&served).unwrap();
    fs::write(temp_dir.path().join("secret.txt"), b"top secret").unwrap();
    let addr = start_server(&served, 2);

    let out = exchange_until_close(
        addr,
        b"get_metadata ../secret.txt\r\nget_slice .. 0 1\r\nquit\r\n",
    );
    assert_eq!(
        out,
        "201 INVALID ARGUMENTS FOR COMMAND\r\n\
         201 INVALID ARGUMENTS FOR COMMAND\r\n\
         0 OK\r\n"
    );
}

// =============================================================================
// Termination Tests
// =============================================================================

#[test]
fn test_quit_closes_socket() {
    let (_temp_dir, addr) = setup();
    assert_eq!(exchange_until_close(addr, b"quit\r\n"), "0 OK\r\n");
}

#[test]
fn test_bad_eol_closes_socket() {
    let (_temp_dir, addr) = setup();
    assert_eq!(
        exchange_until_close(addr, b"get_metadata a.txt\nquit\r\n"),
        "100 BAD EOL\r\n"
    );
}

#[test]
fn test_oversized_request_closes_socket() {
    let (_temp_dir, addr) = setup();
    assert_eq!(exchange_until_close(addr, &[b'x'; 4096]), "101 BAD REQUEST\r\n");
}

// =============================================================================
// Admission Tests
// =============================================================================

#[test]
fn test_connection_cap_defers_extra_client() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), b"abcd").unwrap();
    let addr = start_server(temp_dir.path(), 2);

    // Round trips prove both sessions were admitted
    let mut first = Client::connect(addr).unwrap();
    let mut second = Client::connect(addr).unwrap();
    assert_eq!(first.metadata("a.txt").unwrap(), 4);
    assert_eq!(second.metadata("a.txt").unwrap(), 4);

    // The kernel completes the handshake, but no session reads the request
    let mut third = TcpStream::connect(addr).unwrap();
    third.write_all(b"get_metadata a.txt\r\n").unwrap();
    third.set_read_timeout(Some(Duration::from_millis(300))).unwrap();
    let mut byte = [0u8; 1];
    match third.read(&mut byte) {
        Err(e) => assert!(matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)),
        Ok(n) => panic!("Third client was served early ({} bytes)", n),
    }

    first.quit().unwrap();

    third.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    assert_eq!(read_exactly(&mut third, "0 OK\r\n4\r\n".len()), "0 OK\r\n4\r\n");
    assert_eq!(second.metadata("a.txt").unwrap(), 4);
}

#[test]
fn test_sessions_hold_admission_slots() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), b"abcd").unwrap();
    let config = Config::builder()
        .served_dir(temp_dir.path())
        .listen_addr("127.0.0.1:0")
        .max_connections(3)
        .build();
    let server = Server::bind(config).unwrap();
    let addr = server.local_addr().unwrap();
    let admission = Arc::clone(server.admission());
    assert_eq!(admission.capacity(), 3);
    assert_eq!(admission.in_use(), 0);
    server.spawn().unwrap();

    // One slot is held by the accept loop waiting for the next client
    wait_for_in_use(&admission, 1);

    let mut client = Client::connect(addr).unwrap();
    assert_eq!(client.metadata("a.txt").unwrap(), 4);
    wait_for_in_use(&admission, 2);

    client.quit().unwrap();
    wait_for_in_use(&admission, 1);
}

#[test]
fn test_bind_rejects_zero_cap() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .served_dir(temp_dir.path())
        .listen_addr("127.0.0.1:0")
        .max_connections(0)
        .build();
    assert!(matches!(Server::bind(config), Err(HftpError::Config(_))));
}

#[test]
fn test_bind_rejects_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .served_dir(temp_dir.path().join("nope"))
        .listen_addr("127.0.0.1:0")
        .build();
    assert!(Server::bind(config).is_err());
}
