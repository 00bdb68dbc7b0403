//! The blob store the benchmark compares against the filesystem.
//!
//! The harness only relies on the [`BlobStore`] contract: create the table,
//! put a blob by name, get a blob by name. [`sqlite::SqliteBlobStore`] is the
//! implementation the binary uses.

pub mod pool;
pub mod sqlite;

use std::io::{self, Read, Write};

use thiserror::Error;

pub use pool::{ConnectionPool, PooledConnection};
pub use sqlite::SqliteBlobStore;

/// Failures reported by a blob store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("unexpected column type: {0}")]
    Column(#[from] rusqlite::types::FromSqlError),

    #[error("blob i/o: {0}")]
    Io(#[from] io::Error),

    #[error("no record named {name}")]
    NotFound { name: String },

    #[error("more than one record named {name}")]
    ExtraRow { name: String },

    #[error("payload of {len} bytes exceeds the store's blob limit")]
    TooLarge { len: u64 },
}

/// Keyed binary storage: one opaque payload per unique name.
///
/// Implementations are shared by all benchmark workers at once, so every
/// method takes `&self` and must be safe to call concurrently.
pub trait BlobStore: Send + Sync {
    /// Create the table holding the records. Fails if it already exists.
    fn create_schema(&self) -> Result<(), StoreError>;

    /// Store `payload` under `name` in one statement. Returns rows affected.
    fn insert(&self, name: &str, payload: &[u8]) -> Result<usize, StoreError>;

    /// Reserve `len` zeroed bytes under `name`, then stream `source` into
    /// the reserved blob. Returns the number of bytes copied.
    fn insert_streamed(
        &self,
        name: &str,
        len: u64,
        source: &mut dyn Read,
    ) -> Result<u64, StoreError>;

    /// Full payload stored under `name`, or `None` if there is no record.
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Drain the payload stored under `name` into `sink`.
    ///
    /// Fails with [`StoreError::NotFound`] if there is no record and with
    /// [`StoreError::ExtraRow`] if more than one record matches.
    fn copy_to(&self, name: &str, sink: &mut dyn Write) -> Result<u64, StoreError>;
}
