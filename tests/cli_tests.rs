// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI integration tests.
//!
//! These tests run the actual odomcodec binary and verify its behavior.

mod common;

use std::{
    path::PathBuf,
    process::{Command, Output},
};

use common::{
    indexed_sample, standard_topics, write_db3, write_mcap, FixtureMessage, ScratchDir,
};

/// Get the path to the built odomcodec binary
fn odomcodec_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    // The test binary is in target/debug/deps/
    // The odomcodec binary is in target/debug/
    path.pop(); // deps
    path.pop(); // debug or release
    path.push("odomcodec");
    path
}

/// Run odomcodec with arguments
fn run(args: &[&str]) -> Output {
    let bin = odomcodec_bin();
    Command::new(&bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|_| panic!("Failed to run {:?}", bin))
}

/// Run odomcodec and assert success
fn run_ok(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "Command failed: {:?}\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn sample_log(dir: &ScratchDir, name: &str, count: usize) -> PathBuf {
    let path = dir.join(name);
    let messages: Vec<FixtureMessage> = (0..count)
        .flat_map(|i| {
            let t = 1_700_000_000_000_000_000 + i as i64 * 20_000_000;
            [
                FixtureMessage::odometry(t, &indexed_sample(i)),
                FixtureMessage::new("/imu", t + 1, vec![0; 8]),
            ]
        })
        .collect();
    if name.ends_with(".mcap") {
        write_mcap(&path, &standard_topics(), &messages);
    } else {
        write_db3(&path, &standard_topics(), &messages);
    }
    path
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let output = run_ok(&["--help"]);
    assert!(output.contains("Export odometry time series"));
    assert!(output.contains("export"));
    assert!(output.contains("topics"));
    assert!(output.contains("inspect"));
}

#[test]
fn test_cli_version() {
    let output = run_ok(&["--version"]);
    assert!(output.contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_success_message() {
    let dir = ScratchDir::new("cli_export");
    let input = sample_log(&dir, "run.db3", 4);
    let output = dir.join("run.otc");

    let stdout = run_ok(&[
        "export",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert_eq!(
        stdout.trim(),
        format!("Odometry data successfully saved to {}", output.display())
    );
    assert!(output.exists());
}

#[test]
fn test_export_missing_input() {
    let dir = ScratchDir::new("cli_missing");
    let input = dir.join("absent.db3");
    let output = dir.join("run.otc");

    let result = run(&[
        "export",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert!(!result.status.success());
    assert_eq!(String::from_utf8_lossy(&result.stdout).trim(), "Bag file not found");
    assert!(!output.exists());
}

#[test]
fn test_export_with_config_file() {
    let dir = ScratchDir::new("cli_config");
    let input = sample_log(&dir, "run.mcap", 3);
    let output = dir.join("from_config.otc");
    let config = dir.join("export.toml");
    std::fs::write(
        &config,
        format!(
            "input = {:?}\noutput = {:?}\ndescription = \"configured\"\n",
            input.display().to_string(),
            output.display().to_string()
        ),
    )
    .unwrap();

    run_ok(&["export", "--config", config.to_str().unwrap()]);

    let stdout = run_ok(&["inspect", output.to_str().unwrap()]);
    assert!(stdout.contains("description: configured"));
    assert!(stdout.contains("Samples: 3"));
}

#[test]
fn test_export_requires_paths() {
    let result = run(&["export"]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("INPUT and OUTPUT"));
}

#[test]
fn test_export_rejects_empty_topic() {
    let dir = ScratchDir::new("cli_empty_topic");
    let input = sample_log(&dir, "run.db3", 2);
    let output = dir.join("run.otc");

    let result = run(&[
        "export",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        "--topic",
        "",
    ]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Topic must not be empty"));
    assert!(!output.exists());
}

#[test]
fn test_export_unknown_format() {
    let result = run(&["export", "a.db3", "b.out", "--format", "parquet"]);
    assert!(!result.status.success());
}

// ============================================================================
// Topics and inspect
// ============================================================================

#[test]
fn test_topics_lists_channels() {
    let dir = ScratchDir::new("cli_topics");
    let input = sample_log(&dir, "run.db3", 2);

    let stdout = run_ok(&["topics", input.to_str().unwrap()]);
    assert!(stdout.contains("Format: rosbag2 SQLite"));
    assert!(stdout.contains("Topic: /Odometry"));
    assert!(stdout.contains("Type: nav_msgs/msg/Odometry"));
    assert!(stdout.contains("Topic: /imu"));

    let stdout = run_ok(&["topics", input.to_str().unwrap(), "--odometry"]);
    assert!(stdout.contains("Topic: /Odometry"));
    assert!(!stdout.contains("Topic: /imu"));
}

#[test]
fn test_inspect_container() {
    let dir = ScratchDir::new("cli_inspect");
    let input = sample_log(&dir, "run.mcap", 5);
    let output = dir.join("run.otc");
    run_ok(&["export", input.to_str().unwrap(), output.to_str().unwrap()]);

    let stdout = run_ok(&["inspect", output.to_str().unwrap(), "--verify"]);
    assert!(stdout.contains("source_bag: "));
    assert!(stdout.contains("timestamps | int64 | 5 values"));
    assert!(stdout.contains("positions/x | float64 | 5 values"));
    assert!(stdout.contains("angular_velocities/z | float64 | 5 values"));
    assert!(stdout.contains("All checksums OK"));
}
