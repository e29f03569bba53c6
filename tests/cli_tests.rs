// End-to-end tests for the cachescope binary
//
// Tables are synthesized as clean latency steps so the expected facts are
// exact; the measure-* tests only check shape since real timings vary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Row of `len` latencies: 1.0 before `at`, 5.0 from `at` on
fn step_row(key: usize, len: usize, at: usize) -> String {
    let values: Vec<&str> = (0..len).map(|i| if i < at { "1.0" } else { "5.0" }).collect();
    format!("{},{}\n", key, values.join(","))
}

fn raw_header(len: usize) -> String {
    let columns: Vec<String> = (1..=len).map(|s| s.to_string()).collect();
    format!("stride\\spots,{}\n", columns.join(","))
}

fn write_table(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn assoc_table() -> String {
    raw_header(24) + &step_row(1024, 24, 16) + &step_row(2048, 24, 8)
}

fn cachescope() -> Command {
    Command::cargo_bin("cachescope").unwrap()
}

// ============================================================================
// analyze-* commands
// ============================================================================

#[test]
fn test_analyze_assoc_text() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir, "assoc.csv", &assoc_table());

    cachescope()
        .arg("analyze-assoc")
        .arg(&table)
        .assert()
        .success()
        .stdout("Associativity=8, entityStride=2048, entitySize=16384\n");
}

#[test]
fn test_analyze_assoc_json() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir, "assoc.csv", &assoc_table());

    let output = cachescope()
        .args(["--format", "json", "analyze-assoc"])
        .arg(&table)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["analysis"], "assoc");
    assert_eq!(report["facts"][0]["kind"], "associativity");
    assert_eq!(report["facts"][0]["ways"], 8);
    assert_eq!(report["facts"][0]["entity_size"], 16384);
    assert_eq!(report["jumps"][1]["key"], 2048);
    assert_eq!(report["config"]["window_size"], 2);
}

#[test]
fn test_analyze_assoc_writes_jump_table() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir, "assoc.csv", &assoc_table());
    let jumps = dir.path().join("jumps.csv");

    cachescope()
        .arg("analyze-assoc")
        .arg(&table)
        .arg("--jumps-out")
        .arg(&jumps)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&jumps).unwrap(), "1024,16\n2048,8\n");
}

#[test]
fn test_analyze_line_size() {
    let dir = TempDir::new().unwrap();
    let content = raw_header(24)
        + &step_row(16, 24, 4)
        + &step_row(24, 24, 4)
        + &step_row(32, 24, 4)
        + &step_row(48, 24, 8);
    let table = write_table(&dir, "line.csv", &content);

    cachescope()
        .arg("analyze-line-size")
        .arg(&table)
        .assert()
        .success()
        .stdout("CacheLineSize=16\n");
}

#[test]
fn test_analyze_levels_csv() {
    let dir = TempDir::new().unwrap();
    let mut content = String::from("bytes,ns\n");
    for (i, ns) in [1.0, 1.0, 1.0, 1.0, 5.0, 5.0, 5.0, 5.0].iter().enumerate() {
        content.push_str(&format!("{},{}\n", 4096 << i, ns));
    }
    let table = write_table(&dir, "levels.csv", &content);

    cachescope()
        .args(["--format", "csv", "analyze-levels"])
        .arg(&table)
        .assert()
        .success()
        .stdout("kind,value\nCacheLevelSize,32768\n");
}

#[test]
fn test_no_facts_message() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir, "assoc.csv", &assoc_table());

    cachescope()
        .arg("analyze-assoc")
        .arg(&table)
        .args(["--jump-scale", "10"])
        .assert()
        .success()
        .stdout("No assoc facts inferred\n");
}

// ============================================================================
// jumps command
// ============================================================================

#[test]
fn test_jumps_to_stdout() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir, "assoc.csv", &assoc_table());

    cachescope()
        .arg("jumps")
        .arg(&table)
        .assert()
        .success()
        .stdout("1024,16\n2048,8\n");
}

#[test]
fn test_jumps_skips_short_rows() {
    let dir = TempDir::new().unwrap();
    let content = assoc_table() + "4096,1.0,2.0,3.0\n";
    let table = write_table(&dir, "assoc.csv", &content);

    cachescope()
        .arg("jumps")
        .arg(&table)
        .args(["--window-size", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4096").not())
        .stderr(predicate::str::contains("Skipping row 4096"));
}

// ============================================================================
// Errors and configuration
// ============================================================================

#[test]
fn test_malformed_table_fails() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir, "bad.csv", "stride\\spots,1,2\n16,1.0,abc\n");

    cachescope()
        .arg("analyze-assoc")
        .arg(&table)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error on line 2"));
}

#[test]
fn test_missing_table_fails() {
    cachescope()
        .args(["analyze-assoc", "/nonexistent/table.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read table"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir, "assoc.csv", &assoc_table());
    let config = write_table(&dir, "cachescope.toml", "[analysis]\nwindow_size = 0\n");

    cachescope()
        .arg("--config")
        .arg(&config)
        .arg("analyze-assoc")
        .arg(&table)
        .assert()
        .failure()
        .stderr(predicate::str::contains("window_size"));
}

#[test]
fn test_config_file_applies() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir, "assoc.csv", &assoc_table());
    let config = write_table(&dir, "cachescope.toml", "[analysis]\njump_scale = 10.0\n");

    cachescope()
        .arg("--config")
        .arg(&config)
        .arg("analyze-assoc")
        .arg(&table)
        .assert()
        .success()
        .stdout("No assoc facts inferred\n");
}

// ============================================================================
// measure-* commands
// ============================================================================

#[test]
fn test_measure_assoc_tiny_sweep() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("raw.csv");

    cachescope()
        .args([
            "measure-assoc",
            "--max-memory",
            "65536",
            "--max-ways",
            "4",
            "--min-stride",
            "16",
            "--max-stride",
            "64",
            "--repeats",
            "1000",
            "--no-pin",
            "--seed",
            "7",
        ])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "stride\\spots,1,2,3,4");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("16,"));
    assert!(lines[3].starts_with("64,"));
}

#[test]
fn test_measure_levels_tiny_sweep() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("levels.csv");

    cachescope()
        .args([
            "measure-levels",
            "--min-bytes",
            "1024",
            "--max-bytes",
            "16384",
            "--experiments",
            "3",
            "--warmup-passes",
            "1",
            "--no-pin",
            "--seed",
            "5",
        ])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("bytes,ns\n1024,"));
    assert_eq!(written.lines().count(), 6);
}

fn tiny_stride_sweep() -> Vec<&'static str> {
    vec![
        "--max-memory",
        "65536",
        "--max-ways",
        "4",
        "--min-stride",
        "16",
        "--max-stride",
        "64",
        "--repeats",
        "1000",
        "--no-pin",
        "--seed",
        "11",
    ]
}

fn written_keys(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap().to_string())
        .collect()
}

#[test]
fn test_measure_line_size_uses_interleaved_strides() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("line.csv");

    cachescope()
        .arg("measure-line-size")
        .args(tiny_stride_sweep())
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    // 64 + 32 exceeds max-stride, so only the (16, 24) and (32, 48) pairs run
    assert_eq!(written_keys(&out), vec!["16", "24", "32", "48"]);
}

#[test]
fn test_measure_assoc_honors_configured_schedule() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("raw.csv");
    let config = write_table(&dir, "cachescope.toml", "[sweep]\nschedule = \"interleaved\"\n");

    cachescope()
        .arg("--config")
        .arg(&config)
        .arg("measure-assoc")
        .args(tiny_stride_sweep())
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(written_keys(&out), vec!["16", "24", "32", "48"]);
}

#[test]
fn test_measure_levels_scaled_output() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("levels.csv");

    cachescope()
        .args([
            "measure-levels",
            "--min-bytes",
            "1024",
            "--max-bytes",
            "16384",
            "--experiments",
            "3",
            "--warmup-passes",
            "1",
            "--no-pin",
            "--scale",
            "100",
        ])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    // scaled latencies are rounded to integers
    let written = fs::read_to_string(&out).unwrap();
    for line in written.lines().skip(1) {
        let value = line.split(',').nth(1).unwrap();
        assert!(value.parse::<i64>().is_ok(), "unscaled value {}", value);
    }
}

#[test]
fn test_measure_rejects_bad_stride() {
    cachescope()
        .args(["measure-assoc", "--min-stride", "3", "--no-pin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_stride"));
}
