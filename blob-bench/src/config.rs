//! Run configuration: the four positional arguments plus optional
//! `BLOB_BENCH_*` environment overrides.

use std::env;
use std::path::PathBuf;

use bench_core::constants::DEFAULT_POOL_SIZE;
use log::LevelFilter;

use crate::error::ConfigError;
use crate::generate::SizeRange;
use crate::populate::InsertStrategy;

pub const ENV_LOG_LEVEL: &str = "BLOB_BENCH_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "BLOB_BENCH_LOG_FILE";
pub const ENV_SEED: &str = "BLOB_BENCH_SEED";
pub const ENV_POOL_SIZE: &str = "BLOB_BENCH_POOL_SIZE";
pub const ENV_INSERT: &str = "BLOB_BENCH_INSERT";
pub const ENV_DIR: &str = "BLOB_BENCH_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub n_files: usize,
    pub sizes: SizeRange,
    pub concurrency: usize,
    /// Fixed generator seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub pool_size: usize,
    pub insert: InsertStrategy,
    /// Where the temporary directory and database file are created.
    pub work_dir: PathBuf,
}

impl BenchConfig {
    /// Defaults for everything but the four required parameters.
    pub fn new(n_files: usize, sizes: SizeRange, concurrency: usize) -> Self {
        Self {
            n_files,
            sizes,
            concurrency,
            seed: None,
            pool_size: DEFAULT_POOL_SIZE,
            insert: InsertStrategy::default(),
            work_dir: PathBuf::from("."),
        }
    }

    /// Parse `<program> <nFiles> <minSize> <maxSize> <concurrency>`.
    ///
    /// Arguments are checked in order, and `minSize < maxSize` before the
    /// concurrency argument is looked at.
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        if args.len() != 5 {
            let program = args
                .first()
                .cloned()
                .unwrap_or_else(|| "blob-bench".to_string());
            return Err(ConfigError::Usage { program });
        }

        let n_files = parse_count("nFiles", &args[1])?;
        let min = parse_count("minSize", &args[2])?;
        let max = parse_count("maxSize", &args[3])?;
        let sizes = SizeRange::new(min, max)?;
        let concurrency = parse_count("concurrency", &args[4])?;

        Ok(Self::new(n_files as usize, sizes, concurrency as usize))
    }

    /// Apply `BLOB_BENCH_*` overrides from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| env::var(var).ok())
    }

    /// Apply overrides looked up through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SEED) {
            self.seed = Some(value.trim().parse().map_err(|e| ConfigError::Env {
                var: ENV_SEED,
                value: value.clone(),
                reason: format!("{e}"),
            })?);
        }

        if let Some(value) = lookup(ENV_POOL_SIZE) {
            self.pool_size = match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                Ok(_) => {
                    return Err(ConfigError::Env {
                        var: ENV_POOL_SIZE,
                        value,
                        reason: "pool needs at least one connection".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::Env {
                        var: ENV_POOL_SIZE,
                        value,
                        reason: e.to_string(),
                    })
                }
            };
        }

        if let Some(value) = lookup(ENV_INSERT) {
            self.insert = value.parse().map_err(|reason| ConfigError::Env {
                var: ENV_INSERT,
                value: value.clone(),
                reason,
            })?;
        }

        if let Some(value) = lookup(ENV_DIR) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                self.work_dir = PathBuf::from(trimmed);
            }
        }

        Ok(self)
    }
}

fn parse_count(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    let parsed: i64 = value
        .trim()
        .parse()
        .map_err(|source| ConfigError::NotAnInteger {
            name,
            value: value.to_string(),
            source,
        })?;
    u64::try_from(parsed).map_err(|_| ConfigError::Negative {
        name,
        value: parsed,
    })
}

fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Log level from `BLOB_BENCH_LOG_LEVEL`, `Info` when unset or unknown.
pub fn resolve_log_level() -> LevelFilter {
    env::var(ENV_LOG_LEVEL)
        .ok()
        .as_deref()
        .and_then(parse_log_level)
        .unwrap_or(LevelFilter::Info)
}

/// Log file from `BLOB_BENCH_LOG_FILE`; `None` when unset, empty or `none`.
pub fn resolve_log_file() -> Option<String> {
    let value = env::var(ENV_LOG_FILE).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(trimmed.to_string())
    }
}
