//! Payload generation tests
//!
//! These tests verify the payload contract:
//! - Exact size in both formats
//! - ASCII records are newline-terminated hex of fixed width
//! - Generation is idempotent for an unchanged (count, size)
//! - A file of the wrong size is regenerated

use std::{thread, time::Duration};

use proptest::prelude::*;
use roundtrip_runner::{PayloadFormat, PayloadSpec, ensure_payload};

fn binary(packet_count: u64, packet_size: u64) -> PayloadSpec {
    PayloadSpec { packet_count, packet_size, format: PayloadFormat::Binary, seed: None }
}

fn ascii(packet_count: u64, packet_size: u64) -> PayloadSpec {
    PayloadSpec { packet_count, packet_size, format: PayloadFormat::Ascii, seed: None }
}

#[test]
fn default_binary_payload_has_exact_size() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("block");

    let created = ensure_payload(&path, &binary(10_000, 1498)).expect("generate payload");

    assert_eq!(created, path);
    assert_eq!(std::fs::metadata(&path).expect("metadata").len(), 14_980_000);
}

#[test]
fn ascii_payload_has_fixed_width_hex_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("block");

    ensure_payload(&path, &ascii(10, 20)).expect("generate payload");
    let content = std::fs::read(&path).expect("read payload");

    assert_eq!(content.len(), 200);
    let lines: Vec<&[u8]> = content.split_inclusive(|&b| b == b'\n').collect();
    assert_eq!(lines.len(), 10);
    for line in lines {
        assert_eq!(line.len(), 20);
        assert_eq!(line[19], b'\n');
        assert!(line[..19].iter().all(u8::is_ascii_hexdigit), "non-hex record: {line:?}");
    }
}

#[test]
fn second_call_reuses_existing_payload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("block");
    let spec = binary(100, 64);

    ensure_payload(&path, &spec).expect("first generation");
    let first = std::fs::read(&path).expect("read payload");
    let first_mtime = std::fs::metadata(&path).and_then(|m| m.modified()).expect("mtime");

    // Make a rewrite observable through mtime on coarse filesystems
    thread::sleep(Duration::from_millis(20));

    ensure_payload(&path, &spec).expect("second call");
    let second = std::fs::read(&path).expect("read payload");
    let second_mtime = std::fs::metadata(&path).and_then(|m| m.modified()).expect("mtime");

    assert_eq!(first, second, "payload content must not change");
    assert_eq!(first_mtime, second_mtime, "payload must not be rewritten");
}

#[test]
fn existing_file_with_expected_size_is_trusted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("block");
    std::fs::write(&path, vec![0u8; 64]).expect("write stale payload");

    ensure_payload(&path, &binary(4, 16)).expect("ensure payload");

    assert_eq!(std::fs::read(&path).expect("read payload"), vec![0u8; 64]);
}

#[test]
fn wrong_size_payload_is_regenerated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("block");
    std::fs::write(&path, b"stale").expect("write stale payload");

    ensure_payload(&path, &binary(8, 128)).expect("regenerate payload");

    assert_eq!(std::fs::metadata(&path).expect("metadata").len(), 1024);
}

#[test]
fn switching_format_with_same_size_keeps_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("block");

    ensure_payload(&path, &binary(10, 20)).expect("binary payload");
    let before = std::fs::read(&path).expect("read payload");

    // Reuse is keyed on size only
    ensure_payload(&path, &ascii(10, 20)).expect("ascii request");
    assert_eq!(std::fs::read(&path).expect("read payload"), before);
}

#[test]
fn seeded_payloads_are_reproducible() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let spec = PayloadSpec { seed: Some(1234), ..ascii(50, 33) };

    ensure_payload(&a, &spec).expect("payload a");
    ensure_payload(&b, &spec).expect("payload b");

    assert_eq!(std::fs::read(&a).expect("read a"), std::fs::read(&b).expect("read b"));
}

#[test]
fn missing_parent_directory_is_setup_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing").join("block");

    let result = ensure_payload(&path, &binary(1, 1));
    assert!(matches!(result, Err(roundtrip_core::HarnessError::Io { .. })));
}

#[test]
fn prop_payload_size_is_count_times_size() {
    proptest!(ProptestConfig::with_cases(32), |(
        packet_count in 0u64..64,
        packet_size in 1u64..300,
        use_ascii in any::<bool>(),
    )| {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("block");
        let spec = if use_ascii {
            ascii(packet_count, packet_size)
        } else {
            binary(packet_count, packet_size)
        };

        ensure_payload(&path, &spec).expect("generate payload");

        // PROPERTY: exact size in both formats
        let len = std::fs::metadata(&path).expect("metadata").len();
        prop_assert_eq!(len, packet_count * packet_size);

        if use_ascii {
            let content = std::fs::read(&path).expect("read payload");
            let newlines = content.iter().filter(|&&b| b == b'\n').count() as u64;
            prop_assert_eq!(newlines, packet_count);
        }
    });
}
