//! End-to-end tests of the `blob-bench` binary: arguments, exit status and
//! the result line.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_bench(work_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_blob-bench"))
        .args(args)
        .current_dir(work_dir)
        .env("BLOB_BENCH_LOG_LEVEL", "warn")
        .env("BLOB_BENCH_SEED", "1")
        .env_remove("BLOB_BENCH_DIR")
        .env_remove("BLOB_BENCH_LOG_FILE")
        .output()
        .expect("spawn blob-bench")
}

fn parse_total(field: &str) -> bool {
    // `Duration` debug output: a number followed by a unit.
    let unit_start = field
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(field.len());
    let (value, unit) = field.split_at(unit_start);
    let value: f64 = match value.parse() {
        Ok(v) => v,
        Err(_) => return false,
    };
    value > 0.0 && ["ns", "µs", "ms", "s"].contains(&unit)
}

#[test]
fn successful_run_prints_totals_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_bench(dir.path(), &["5", "1024", "2048", "2"]);

    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8(out.stdout).unwrap();
    let line = stdout.trim_end();
    let rest = line.strip_prefix("total: files: ").expect(line);
    let (files, sql) = rest.split_once("\tsql: ").expect(line);
    assert!(parse_total(files), "{line}");
    assert!(parse_total(sql), "{line}");

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn equal_min_and_max_exits_before_creating_anything() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_bench(dir.path(), &["5", "1024", "1024", "2"]);

    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("must be less than maxSize"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn failing_read_exits_non_zero_without_totals_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    // Every generated file is empty, so the filesystem phase fails.
    let out = run_bench(dir.path(), &["2", "0", "1", "1"]);

    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("empty file"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn non_integer_argument_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_bench(dir.path(), &["five", "1024", "2048", "2"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
}

#[test]
fn wrong_argument_count_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_bench(dir.path(), &["5", "1024"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("USAGE:"));
}

#[test]
fn silenced_logger_still_reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_blob-bench"))
        .args(["1", "9", "3", "1"])
        .current_dir(dir.path())
        .env("BLOB_BENCH_LOG_LEVEL", "off")
        .output()
        .expect("spawn blob-bench");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("minSize 9"));
}

#[test]
fn invalid_insert_override_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_blob-bench"))
        .args(["1", "1", "3", "1"])
        .current_dir(dir.path())
        .env("BLOB_BENCH_INSERT", "mmap")
        .output()
        .expect("spawn blob-bench");
    assert!(!out.status.success());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
