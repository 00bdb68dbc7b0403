//! The two backends under comparison, behind one [`BlobReader`] trait.
//!
//! A read is only meaningful for the benchmark if the whole payload is
//! pulled through, so both readers drain into [`io::sink`] and report the
//! byte count.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ReadError;
use crate::store::{BlobStore, StoreError};

/// Reads a named test payload in full from one backend.
pub trait BlobReader: Send + Sync {
    /// Short label used in logs and in the result line.
    fn backend(&self) -> &'static str;

    /// Read the payload named `name` completely. Returns bytes read.
    fn read(&self, name: &str) -> Result<u64, ReadError>;
}

/// Reads test files straight from a directory.
pub struct FsReader {
    dir: PathBuf,
}

impl FsReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl BlobReader for FsReader {
    fn backend(&self) -> &'static str {
        "files"
    }

    fn read(&self, name: &str) -> Result<u64, ReadError> {
        let path = self.dir.join(name);
        let io_err = |source| ReadError::Io {
            path: path.clone(),
            source,
        };

        let mut file = File::open(&path).map_err(io_err)?;
        let n = io::copy(&mut file, &mut io::sink()).map_err(io_err)?;
        if n == 0 {
            return Err(ReadError::EmptyFile { path });
        }
        Ok(n)
    }
}

/// Reads blob records through a shared [`BlobStore`].
pub struct StoreReader {
    store: Arc<dyn BlobStore>,
}

impl StoreReader {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }
}

impl BlobReader for StoreReader {
    fn backend(&self) -> &'static str {
        "sql"
    }

    fn read(&self, name: &str) -> Result<u64, ReadError> {
        let n = self
            .store
            .copy_to(name, &mut io::sink())
            .map_err(|err| match err {
                StoreError::NotFound { name } => ReadError::NotFound { name },
                StoreError::ExtraRow { name } => ReadError::UnexpectedExtraRow { name },
                source => ReadError::Store {
                    name: name.to_string(),
                    source,
                },
            })?;
        if n == 0 {
            return Err(ReadError::EmptyPayload {
                name: name.to_string(),
            });
        }
        Ok(n)
    }
}
