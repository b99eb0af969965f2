use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("sonarlog"))
}

fn frame(message_id: u16, sender_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = b"BR".to_vec();
    bytes.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&message_id.to_le_bytes());
    bytes.extend_from_slice(&[sender_id, 0]);
    bytes.extend_from_slice(payload);
    let sum = bytes.iter().fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
    bytes.extend_from_slice(&sum.to_le_bytes());
    bytes
}

fn mono_profile(ping_number: u32, sender_id: u8, results: &[u16]) -> Vec<u8> {
    let mut payload = vec![0u8; 52];
    payload[..4].copy_from_slice(&ping_number.to_le_bytes());
    payload[22..24].copy_from_slice(&(results.len() as u16).to_le_bytes());
    for v in results {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    frame(2198, sender_id, &payload)
}

/// JSON header, a corrupted NACK, then two profiles from senders 1 and 2.
fn write_capture(dir: &Path) -> PathBuf {
    let mut data = frame(10, 1, b"{\"fw\":\"1.2\"}");
    let mut nack = frame(2, 1, b"\x05\x00busy");
    nack[9] ^= 0x01;
    data.extend(nack);
    data.extend(mono_profile(7, 1, &[10, 20, 30]));
    data.extend(mono_profile(8, 2, &[40]));
    let path = dir.join("capture.svlog");
    fs::write(&path, data).expect("write capture");
    path
}

fn stdout_json(args: &[&str], input: &Path) -> Value {
    let assert = cmd()
        .arg("scan")
        .arg(input)
        .args(args)
        .arg("--stdout")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("scan").and(contains("profiles")));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.svlog");
    let output = temp.path().join("out.json");

    cmd()
        .arg("scan")
        .arg(missing)
        .arg("-o")
        .arg(output)
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.pcap");
    fs::write(&input, b"BR").expect("write");

    cmd()
        .arg("scan")
        .arg(input)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("unsupported input format"));
}

#[test]
fn stdout_outputs_scan_report() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path());

    let report = stdout_json(&[], &input);
    assert_eq!(report["summary"]["accepted"], 3);
    assert_eq!(report["summary"]["corrupted"], 1);
    assert_eq!(report["rejections"][0]["kind"], "checksum_mismatch");
    assert_eq!(report["packets"][0]["payload"]["message_type"], "JSON header");
    assert_eq!(report["packets"][0]["payload"]["JSON_message"], "{\"fw\":\"1.2\"}");
    assert_eq!(report["packets"][1]["payload"]["pwr_results"], serde_json::json!([10, 20, 30]));
}

#[test]
fn filters_and_cap_apply() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path());

    let report = stdout_json(&["--exclude", "10"], &input);
    let packets = report["packets"].as_array().expect("packets");
    assert_eq!(packets.len(), 2);
    assert!(packets.iter().all(|p| p["header"]["message_id"] == 2198));

    let report = stdout_json(&["--include", "2198,10", "--max-packets", "1"], &input);
    assert_eq!(report["packets"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["packets"][0]["header"]["message_id"], 10);
}

#[test]
fn csv_format_writes_packet_rows() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path());
    let output = temp.path().join("nested").join("packets.csv");

    cmd()
        .arg("scan")
        .arg(&input)
        .args(["--format", "csv", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stderr(contains("OK: output written"));

    let text = fs::read_to_string(&output).expect("csv output");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Packet Position,Message ID,Message Type,Sender ID,Receiver ID,Payload Data")
    );
    assert!(lines.next().expect("row").starts_with("0,10,JSON header,1,0,"));
    assert_eq!(lines.count(), 2);
}

#[test]
fn log_format_writes_message_blocks() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path());

    cmd()
        .arg("scan")
        .arg(&input)
        .args(["--format", "log", "--stdout"])
        .assert()
        .success()
        .stdout(
            contains("Message logs:")
                .and(contains("Packet at byte 0:"))
                .and(contains("[3 values]")),
        );
}

#[test]
fn pretty_requires_json() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path());

    cmd()
        .arg("scan")
        .arg(&input)
        .args(["--format", "csv", "--pretty", "--stdout"])
        .assert()
        .code(2)
        .stderr(contains("--pretty only applies to JSON output"));
}

#[test]
fn stdout_and_output_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path());
    let output = temp.path().join("out.json");

    cmd()
        .arg("scan")
        .arg(&input)
        .arg("--stdout")
        .arg("-o")
        .arg(output)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn output_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path());

    cmd()
        .arg("scan")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .code(2)
        .stderr(contains("output path must differ from input"));
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path());
    let output = temp.path().join("out.json");

    cmd()
        .arg("scan")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
    assert!(output.exists());
}

#[test]
fn glob_input_resolves_single_match() {
    let temp = TempDir::new().expect("tempdir");
    write_capture(temp.path());
    let pattern = temp.path().join("*.svlog");

    let report = stdout_json(&[], &pattern);
    assert_eq!(report["summary"]["accepted"], 3);
}

#[test]
fn glob_input_with_multiple_matches_fails() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path());
    fs::copy(&input, temp.path().join("second.svlog")).expect("copy");
    let pattern = temp.path().join("*.svlog");

    cmd()
        .arg("scan")
        .arg(pattern)
        .arg("--stdout")
        .assert()
        .code(2)
        .stderr(contains("multiple files match pattern"));
}

#[test]
fn profiles_exports_selected_sender() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path());

    let assert = cmd()
        .arg("profiles")
        .arg(&input)
        .args(["--sender", "2", "--stdout"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let mut lines = stdout.lines();
    let header: Vec<_> = lines.next().expect("header").split(',').collect();
    assert_eq!(header.first(), Some(&"analog_gain"));
    let ping_col = header.iter().position(|h| *h == "ping_number").expect("ping_number");
    let row: Vec<_> = lines.next().expect("row").split(',').collect();
    assert_eq!(row[ping_col], "8");
    assert!(lines.next().is_none());
}

#[test]
fn profiles_without_matches_fails_with_hint() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path());
    let output = temp.path().join("profiles.csv");

    cmd()
        .arg("profiles")
        .arg(&input)
        .args(["--sender", "9", "-o"])
        .arg(&output)
        .assert()
        .code(2)
        .stderr(contains("no Mono Profile packets from sender 9").and(contains("hint:")));
    assert!(!output.exists());
}
