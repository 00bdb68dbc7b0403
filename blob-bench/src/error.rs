//! Error taxonomy of a benchmark run.
//!
//! Every layer has its own enum; [`BenchError`] is the run-level union the
//! harness returns. Nothing is retried: the first error observed ends the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

/// Bad command line or environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("USAGE: {program} <nr-of-files> <min-size> <max-size> <concurrency>")]
    Usage { program: String },

    #[error("{name} must be an integer, got {value:?}")]
    NotAnInteger {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: i64 },

    #[error("minSize {min} must be less than maxSize {max}")]
    SizeRange { min: u64, max: u64 },

    #[error("invalid value {value:?} for {var}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Failure while creating the test files.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("cannot create temporary workspace in {}", dir.display())]
    Workspace {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("test file {} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("cannot create test file {}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("random source failed while filling {}", path.display())]
    RandomSource {
        path: PathBuf,
        #[source]
        source: rand::Error,
    },

    #[error("cannot write test file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure while copying the test files into the blob store.
#[derive(Debug, Error)]
pub enum PopulationError {
    #[error("cannot create blob table")]
    Schema(#[source] StoreError),

    #[error("cannot list test files")]
    Glob(#[from] glob::PatternError),

    #[error("cannot list test files")]
    GlobEntry(#[from] glob::GlobError),

    #[error("expected {expected} test files but was {found}")]
    CountMismatch { expected: usize, found: usize },

    #[error("cannot read test file {}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot store {name} in database")]
    Insert {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("storing {name} affected {rows} rows, expected 1")]
    RowsAffected { name: String, rows: usize },

    #[error("expected {expected} bytes to be written for {name} but was {written}")]
    ShortWrite {
        name: String,
        expected: u64,
        written: u64,
    },
}

/// Failure of a single benchmarked read.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("empty file {}", path.display())]
    EmptyFile { path: PathBuf },

    #[error("no data for filename: {name}")]
    NotFound { name: String },

    #[error("empty payload for {name}")]
    EmptyPayload { name: String },

    #[error("expected no more rows for {name}")]
    UnexpectedExtraRow { name: String },

    #[error("store read of {name} failed")]
    Store {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("cannot start {backend} worker")]
    Spawn {
        backend: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{backend} worker exited without reporting completion")]
    WorkerLost { backend: &'static str },
}

/// Failure to remove the temporary artifacts of a run.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("cannot remove temporary database {}", path.display())]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot remove temporary directory {}", path.display())]
    RemoveDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Everything a run can fail with.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("test data generation failed")]
    Generation(#[from] GenerationError),

    #[error("store population failed")]
    Population(#[from] PopulationError),

    #[error("benchmark phase failed")]
    Read(#[from] ReadError),

    #[error("cleanup failed")]
    Cleanup(#[from] CleanupError),

    #[error("cannot open blob store")]
    Store(#[from] StoreError),
}
