//! Integration tests for the settle CLI
//!
//! Runs the built binary against the snapshot fixtures and checks the JSON
//! it writes and its exit code.

use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn run_settle(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_settle"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("PAYOUT_CONFIG_PATH")
        .output()
        .expect("Failed to execute settle")
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).display().to_string()
}

#[test]
fn test_settles_multiple_snapshots_in_order() {
    let output = run_settle(&[
        &fixture("cpmm_yes.json"),
        &fixture("dpm_yes.json"),
        "--log-level",
        "warn",
    ]);
    assert!(
        output.status.success(),
        "settle failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let results: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let results = results.as_array().expect("array of results");
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["report"]["contractId"], "c-binary");
    assert_eq!(results[0]["report"]["payoutInfo"]["creatorPayout"], 2.0);
    assert!(results[0].get("error").is_none());
    assert!(results[0]["report"].get("byUser").is_none());

    assert_eq!(results[1]["report"]["contractId"], "c-dpm");
    assert_eq!(results[1]["report"]["payoutInfo"]["payouts"][0]["userId"], "alice");
}

#[test]
fn test_by_user_breakdown_and_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reports.json");
    let out_str = out.display().to_string();

    let output = run_settle(&[&fixture("cpmm_yes.json"), "--by-user", "--output", &out_str]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let alice = &written[0]["report"]["byUser"]["alice"];
    assert_eq!(alice["bettor"], 70.0);
    assert_eq!(alice["loan"], -10.0);
}

#[test]
fn test_failed_snapshot_sets_exit_code() {
    let output = run_settle(&[
        &fixture("cpmm_yes.json"),
        &fixture("unsupported_mechanism.json"),
        &fixture("cpmm_mkt_missing_probability.json"),
        "--log-level",
        "error",
    ]);
    assert_eq!(output.status.code(), Some(1));

    let results: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert!(results[0].get("report").is_some());
    assert!(results[1].get("report").is_none());
    assert!(results[1]["error"]
        .as_str()
        .unwrap()
        .contains("Payouts not implemented for mechanism unsupported"));
    assert!(results[2]["error"]
        .as_str()
        .unwrap()
        .contains("Invalid settlement input"));
}

#[test]
fn test_missing_snapshot_reported_not_fatal() {
    let output = run_settle(&[&fixture("does_not_exist.json"), &fixture("dpm_yes.json")]);
    assert_eq!(output.status.code(), Some(1));

    let results: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(results[0]["error"].as_str().unwrap().contains("failed to read"));
    assert_eq!(results[1]["report"]["contractId"], "c-dpm");
}

#[test]
fn test_config_file_applies_dpm_fees() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("payout_config.toml");
    fs::write(
        &config,
        "[dpm_fees]\nplatform_fee_rate = 0.0\ncreator_fee_rate = 0.1\n",
    )
    .unwrap();
    let config_str = config.display().to_string();

    let output = run_settle(&[&fixture("dpm_yes.json"), "--config", &config_str]);
    assert!(output.status.success());

    let results: Value = serde_json::from_slice(&output.stdout).unwrap();
    let creator_payout = results[0]["report"]["payoutInfo"]["creatorPayout"].as_f64().unwrap();
    assert!((creator_payout - 7.0).abs() < 1e-9);
}
