//! Benchmark runner: prints a single result line to stdout.
//!
//! Usage:
//!   blob-bench <nr-of-files> <min-size> <max-size> <concurrency>
//!
//! Optional environment overrides:
//!   BLOB_BENCH_LOG_LEVEL   off|error|warn|info|debug|trace (default info)
//!   BLOB_BENCH_LOG_FILE    also write the log to this file
//!   BLOB_BENCH_SEED        fixed seed for the test data generator
//!   BLOB_BENCH_POOL_SIZE   SQLite connections shared by the workers (default 10)
//!   BLOB_BENCH_INSERT      buffer|stream (default stream)
//!   BLOB_BENCH_DIR         where temporary files are created (default .)

use std::env;
use std::process;

use anyhow::Context;
use blob_bench::config::{resolve_log_file, resolve_log_level};
use blob_bench::{BenchConfig, RunReport};

fn try_main() -> anyhow::Result<RunReport> {
    let args: Vec<String> = env::args().collect();
    let config = BenchConfig::from_args(&args)?.with_env()?;

    log::info!(
        "benchmarking {} files of {}..{} bytes with {} workers",
        config.n_files,
        config.sizes.min(),
        config.sizes.max(),
        config.concurrency
    );

    blob_bench::run(&config).context("benchmark run failed")
}

fn main() {
    let log_file = resolve_log_file();
    bench_core::initialize_logger(resolve_log_level(), log_file.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {}. Exiting.", e);
        process::exit(1);
    });

    match try_main() {
        Ok(report) => println!("{report}"),
        Err(e) => {
            if log::log_enabled!(log::Level::Error) {
                log::error!("{e:#}");
            } else {
                eprintln!("{e:#}");
            }
            process::exit(1);
        }
    }
}
