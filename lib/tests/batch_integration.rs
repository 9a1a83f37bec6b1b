//! End-to-end coverage of the boundary scenarios from spec.md's S2/S3/S5
//! against a real loopback TCP socket standing in for a PLC, exercising the
//! full transport -> frame -> commands -> batch stack instead of just the
//! per-module unit tests.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use mc3e::ConnectionConfig;

/// A binary-mode 3E response: 9 bytes of (unchecked) echoed header, a
/// little-endian status, then the payload.
fn fake_response(status: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; 9];
    out.extend_from_slice(&status.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

fn serve_once(listener: &TcpListener, response: Vec<u8>) {
    let (mut stream, _) = listener.accept().expect("accept");
    let mut buf = [0u8; 256];
    let _ = stream.read(&mut buf);
    stream.write_all(&response).expect("write response");
    stream.flush().expect("flush response");
}

fn config_for(listener: &TcpListener) -> ConnectionConfig {
    let mut config = ConnectionConfig::default();
    config.host = "127.0.0.1".to_string();
    config.port = listener.local_addr().unwrap().port();
    config.timeout = Duration::from_secs(2);
    config
}

#[test]
fn s2_word_batch_happy_path() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let config = config_for(&listener);

    // randomread(D100, D200, D201) -> words [10, 20, 30].
    let payload: Vec<u8> = [10i16, 20, 30].iter().flat_map(|v| v.to_le_bytes()).collect();
    let response = fake_response(0x0000, &payload);

    let server = thread::spawn(move || serve_once(&listener, response));
    let inputs = vec!["D100".to_string(), "D200:2".to_string()];
    let results = mc3e::batch_read(&config, &inputs);
    server.join().unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].device, "D100");
    assert!(results[0].success);
    assert_eq!(results[0].values, vec![10]);
    assert_eq!(results[1].device, "D200:2");
    assert!(results[1].success);
    assert_eq!(results[1].values, vec![20, 30]);
}

#[test]
fn s3_randomread_fallback_isolates_per_item_errors() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let config = config_for(&listener);

    // Connection 1: randomread fails with 0xC056 (command malformed),
    // triggering the dispatcher's per-input batchread_word fallback.
    // Connection 2: batchread_word(D100) succeeds with [10].
    // Connection 3: batchread_word(D9999) fails with 0xC053 (device out
    // of range).
    let randomread_fail = fake_response(0xC056, &[]);
    let d100_ok = fake_response(0x0000, &10i16.to_le_bytes());
    let d9999_fail = fake_response(0xC053, &[]);

    let server = thread::spawn(move || {
        serve_once(&listener, randomread_fail);
        serve_once(&listener, d100_ok);
        serve_once(&listener, d9999_fail);
    });

    let inputs = vec!["D100".to_string(), "D9999".to_string()];
    let results = mc3e::batch_read(&config, &inputs);
    server.join().unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].device, "D100");
    assert!(results[0].success);
    assert_eq!(results[0].values, vec![10]);

    assert_eq!(results[1].device, "D9999");
    assert!(!results[1].success);
    assert!(results[1].error.as_ref().unwrap().contains("C053"));
}

#[test]
fn s3_fallback_connect_failure_is_uniform_across_the_whole_batch() {
    // A connect failure that surfaces mid-fallback (on the first retried
    // batchread_word, not on the initial randomread) must still short-
    // circuit to the whole-batch uniform connect-failure result, not an
    // isolated per-item error for just the device that happened to trip it.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let config = config_for(&listener);

    let randomread_fail = fake_response(0xC056, &[]);
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        // Dropping the listener here (rather than after responding) closes
        // it before the client can observe the randomread response and
        // attempt its fallback retries, so every subsequent connection on
        // this port is guaranteed refused deterministically.
        drop(listener);
        let mut buf = [0u8; 256];
        let _ = stream.read(&mut buf);
        stream.write_all(&randomread_fail).expect("write response");
        stream.flush().expect("flush response");
    });

    let inputs = vec!["D100".to_string(), "D9999".to_string()];
    let results = mc3e::batch_read(&config, &inputs);
    server.join().unwrap();

    assert_eq!(results.len(), 2);
    for (result, input) in results.iter().zip(&inputs) {
        assert_eq!(&result.device, input);
        assert!(!result.success);
        assert!(result
            .error
            .as_ref()
            .unwrap()
            .starts_with("PLC connection error:"));
    }
}

#[test]
fn s5_connect_failure_is_uniform_across_every_input() {
    // Bind then drop the listener so the port is guaranteed unoccupied;
    // connecting to it should fail fast rather than hang for the full
    // timeout.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut config = ConnectionConfig::default();
    config.host = "127.0.0.1".to_string();
    config.port = port;
    config.timeout = Duration::from_secs(1);

    let inputs = vec!["D0".to_string(), "M1".to_string()];
    let results = mc3e::batch_read(&config, &inputs);

    assert_eq!(results.len(), 2);
    for (result, input) in results.iter().zip(&inputs) {
        assert_eq!(&result.device, input);
        assert!(!result.success);
        assert!(result
            .error
            .as_ref()
            .unwrap()
            .starts_with("PLC connection error:"));
    }
}

#[test]
fn s4_bit_batch_read_unpacks_nibbles() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let config = config_for(&listener);

    // batchread_bit(M0, 3) -> payload [0x10, 0x01] -> bits [1, 0, 1].
    let response = fake_response(0x0000, &[0x10, 0x01]);
    let server = thread::spawn(move || serve_once(&listener, response));

    let inputs = vec!["M0:3".to_string()];
    let results = mc3e::batch_read(&config, &inputs);
    server.join().unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].values, vec![1, 0, 1]);
}
