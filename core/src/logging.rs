//! log4rs setup used by every binary in the workspace.
//!
//! Records always go to stderr so that stdout stays reserved for the
//! benchmark result line. An optional log file receives the same records.

use log::{LevelFilter, SetLoggerError};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::{pattern::PatternEncoder, Encode},
    filter::threshold::ThresholdFilter,
};
use std::{backtrace, env, io};

const LOGGING_PATTERN: &str = "{d} {l} {f}:{L} - {m}{n}";

/// Failure to bring up the logger.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("cannot open log file: {0}")]
    File(#[source] io::Error),
    #[error("invalid logger configuration: {0}")]
    Config(String),
    #[error("logger already initialised: {0}")]
    AlreadySet(#[from] SetLoggerError),
}

/// Pattern encoder that appends a captured backtrace to `error` records when
/// `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` is set.
#[derive(Debug)]
struct BacktracePatternEncoder {
    pattern_encoder: PatternEncoder,
    is_backtrace_enabled: bool,
}

impl BacktracePatternEncoder {
    fn new(pattern: &str) -> Self {
        BacktracePatternEncoder {
            pattern_encoder: PatternEncoder::new(pattern),
            is_backtrace_enabled: env::var("RUST_BACKTRACE").is_ok()
                || env::var("RUST_LIB_BACKTRACE").is_ok(),
        }
    }
}

impl Encode for BacktracePatternEncoder {
    fn encode(
        &self,
        w: &mut dyn log4rs::encode::Write,
        record: &log::Record<'_>,
    ) -> anyhow::Result<()> {
        if record.level() != log::Level::Error || !self.is_backtrace_enabled {
            return self.pattern_encoder.encode(w, record);
        }

        self.pattern_encoder.encode(
            w,
            &log::Record::builder()
                .args(format_args!(
                    "{}\nBacktrace:\n{}",
                    record.args(),
                    backtrace::Backtrace::capture()
                ))
                .level(record.level())
                .target(record.target())
                .module_path(record.module_path())
                .file(record.file())
                .line(record.line())
                .build(),
        )
    }
}

/// Install the process-wide logger.
///
/// `log_level` applies to both stderr and the optional `file_path`.
pub fn initialize_logger(
    log_level: LevelFilter,
    file_path: Option<&str>,
) -> Result<(), LoggerError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(BacktracePatternEncoder::new(LOGGING_PATTERN)))
        .build();

    let mut config_builder = Config::builder().appender(
        Appender::builder()
            .filter(Box::new(ThresholdFilter::new(log_level)))
            .build("stderr", Box::new(stderr)),
    );
    let mut root = Root::builder().appender("stderr");

    if let Some(path) = file_path {
        let logfile = FileAppender::builder()
            .encoder(Box::new(BacktracePatternEncoder::new(LOGGING_PATTERN)))
            .build(path)
            .map_err(LoggerError::File)?;

        config_builder =
            config_builder.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root = root.appender("logfile");
    }

    let config = config_builder
        .build(root.build(log_level))
        .map_err(|e| LoggerError::Config(e.to_string()))?;

    log4rs::init_config(config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritable_log_file_is_reported_before_install() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().into_owned();

        let err = initialize_logger(LevelFilter::Info, Some(path.as_str())).unwrap_err();
        assert!(matches!(err, LoggerError::File(_)));
        assert!(err.to_string().starts_with("cannot open log file: "));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn config_error_carries_its_message() {
        let err = LoggerError::Config("no appenders".to_string());
        assert_eq!(err.to_string(), "invalid logger configuration: no appenders");
    }

    #[test]
    fn logger_installs_once() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("bench.log");
        let path = log_path.to_string_lossy().into_owned();

        initialize_logger(LevelFilter::Debug, Some(path.as_str())).unwrap();
        log::info!("first line");
        assert!(log_path.exists());

        assert!(matches!(
            initialize_logger(LevelFilter::Debug, None),
            Err(LoggerError::AlreadySet(_))
        ));
    }
}
