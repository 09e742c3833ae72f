//! End-to-end tests for the `vitals` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const T0: i64 = 1_700_000_000_000;

fn vitals() -> Command {
    let mut cmd = Command::cargo_bin("vitals").unwrap();
    cmd.env_remove("VITALS_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_json(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// 60 ECG samples alternating ±1 with a sustained spike at 6..=8.
fn ecg_with_spike() -> NamedTempFile {
    let samples: Vec<String> = (0..60)
        .map(|i| {
            let value = if (6..=8).contains(&i) {
                10.0
            } else if i % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            format!(r#"{{"timestamp": {}, "value": {}}}"#, T0 + i * 1000, value)
        })
        .collect();
    write_json(&format!("[{}]", samples.join(",")))
}

fn parse_output(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn detect_reports_primary_anomaly() {
    let ecg = ecg_with_spike();
    let output = vitals()
        .args(["detect", "--primary"])
        .arg(ecg.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let anomalies = parse_output(&output);
    let list = anomalies.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["type"], "ECG");
    assert_eq!(list[0]["severity"], "high");
    assert_eq!(list[0]["status"], "active");
}

#[test]
fn detect_type_filter_excludes_other_detectors() {
    let ecg = ecg_with_spike();
    vitals()
        .args(["detect", "--type", "EEG", "--primary"])
        .arg(ecg.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn detect_time_range_drops_the_spike() {
    let ecg = ecg_with_spike();
    // Keeps indices 10..=59, which no longer contain the spike.
    vitals()
        .args(["detect", "--start", &(T0 + 10_000).to_string(), "--primary"])
        .arg(ecg.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn detect_rejects_unknown_type() {
    let ecg = ecg_with_spike();
    vitals()
        .args(["detect", "--type", "EMG", "--primary"])
        .arg(ecg.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("EMG"));
}

#[test]
fn detect_rejects_out_of_order_samples() {
    let ecg = write_json(r#"[{"timestamp": 2, "value": 1.0}, {"timestamp": 1, "value": 1.0}]"#);
    vitals()
        .args(["detect", "--primary"])
        .arg(ecg.path())
        .assert()
        .failure();
}

#[test]
fn detect_rejects_malformed_json() {
    let ecg = write_json(r#"[{"timestamp": 1}]"#);
    vitals()
        .args(["detect", "--primary"])
        .arg(ecg.path())
        .assert()
        .failure();
}

#[test]
fn detect_requires_some_input() {
    vitals()
        .arg("detect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--primary"));
}

#[test]
fn synthesize_is_reproducible_with_seed() {
    let ecg = ecg_with_spike();
    let run = || {
        vitals()
            .args(["synthesize", "--seed", "7", "--primary"])
            .arg(ecg.path())
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    let first = run();
    assert_eq!(first, run());

    let bands = parse_output(&first);
    let list = bands.as_array().unwrap();
    assert_eq!(list.len(), 60);
    assert_eq!(list[0]["timestamp"], T0);
    for key in ["alpha", "beta", "theta", "delta"] {
        assert!(list[0][key].is_f64());
    }
}

#[test]
fn config_file_changes_engine() {
    let ecg = ecg_with_spike();
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[engine.thresholds]\nanchor_sigma = 50.0").unwrap();

    vitals()
        .arg("--config")
        .arg(config.path())
        .args(["detect", "--primary"])
        .arg(ecg.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn config_command_prints_engine_settings() {
    vitals()
        .args(["--config", "/nonexistent/vitals.toml", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("anchor_sigma = 2.5"));
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[engine]\nedge_guard = 10").unwrap();
    vitals()
        .arg("--config")
        .arg(config.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_samples"));
}
