mod common;

use common::ScriptedPort;
use gcodesend_communication::{wait_for_ready, StreamConfig};
use gcodesend_core::{ConnectionError, Error};

#[test]
fn test_handshake_tolerates_noise() {
    let port = ScriptedPort::new(&["garbage", "M105 stale", "wait"]);
    let mut link = port.link();

    wait_for_ready(&mut link, &StreamConfig::default()).unwrap();

    assert_eq!(port.remaining_replies(), 0);
}

#[test]
fn test_handshake_writes_two_wake_lines() {
    let port = ScriptedPort::new(&["wait"]);
    let mut link = port.link();

    wait_for_ready(&mut link, &StreamConfig::default()).unwrap();

    assert_eq!(port.written(), "\r\n\r\n");
}

#[test]
fn test_handshake_times_out_without_replies() {
    let port = ScriptedPort::new(&[]);
    let mut link = port.link();

    let err = wait_for_ready(&mut link, &StreamConfig::default()).unwrap_err();

    assert!(matches!(
        err,
        Error::Connection(ConnectionError::LinkTimeout { timeout_ms: 100 })
    ));
}

#[test]
fn test_handshake_empty_line_is_timeout() {
    let port = ScriptedPort::new(&["start", "", "wait"]);
    let mut link = port.link();

    let err = wait_for_ready(&mut link, &StreamConfig::default()).unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(port.remaining_replies(), 1);
}

#[test]
fn test_handshake_does_not_accept_ok() {
    let port = ScriptedPort::new(&["ok 0", "Resend:1"]);
    let mut link = port.link();

    let err = wait_for_ready(&mut link, &StreamConfig::default()).unwrap_err();

    assert!(err.is_timeout());
}

#[test]
fn test_handshake_custom_wake_lines() {
    let port = ScriptedPort::new(&["wait"]);
    let mut link = port.link();
    let config = StreamConfig {
        wake_lines: 3,
        ..StreamConfig::default()
    };

    wait_for_ready(&mut link, &config).unwrap();

    assert_eq!(port.sent_lines(), vec!["", "", ""]);
}
