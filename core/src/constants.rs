//! Constants shared between the benchmark library, binary and benches.

/// Upper bound on a single write while generating test files (8 MiB).
///
/// Generation never holds more than one chunk of random data in memory,
/// no matter how large the requested file is.
pub const WRITE_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Extension given to every generated test file.
pub const TEST_FILE_EXTENSION: &str = "bin";

/// Prefix for the temporary directory and database file of a run.
pub const TEMP_PREFIX: &str = "sqlite-bench-";

/// Suffix for the temporary database file of a run.
pub const DB_SUFFIX: &str = ".db";

/// Name of the table holding the blob records.
pub const BLOB_TABLE: &str = "files";

/// Number of pooled SQLite connections when not overridden.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// How long a pooled connection waits on a locked database before failing.
pub const BUSY_TIMEOUT_MS: u64 = 5_000;

/// Name of the test file with the given zero-based index, e.g. `3.bin`.
pub fn test_file_name(index: usize) -> String {
    format!("{index}.{TEST_FILE_EXTENSION}")
}
