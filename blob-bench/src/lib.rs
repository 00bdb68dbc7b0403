//! SQLite BLOB vs. filesystem read benchmark
//!
//! Generates a set of random test files, copies each one into an SQLite
//! table as a BLOB, then reads every file back through both backends from a
//! fixed number of concurrent workers. The summed read latencies of the two
//! phases are the comparison.
//!
//! Run the benchmark: `cargo run --release -- <nFiles> <minSize> <maxSize> <concurrency>`
//! Run tests: `cargo test`

pub mod config;
pub mod engine;
pub mod error;
pub mod generate;
pub mod harness;
pub mod populate;
pub mod reader;
pub mod report;
pub mod store;
pub mod workspace;

pub use config::BenchConfig;
pub use error::BenchError;
pub use harness::run;
pub use report::RunReport;
