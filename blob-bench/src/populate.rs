//! Store population: copy every generated test file into the blob store under
//! its base name, checking that every byte made it in.

use std::fmt;
use std::fs::{self, File};
use std::path::Path;
use std::str::FromStr;

use bench_core::constants::TEST_FILE_EXTENSION;

use crate::error::PopulationError;
use crate::store::BlobStore;

/// How a file's bytes are handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertStrategy {
    /// Read the file into memory and bind it as a single parameter.
    Buffer,
    /// Reserve a zeroed blob of the file's length, then stream the file in.
    #[default]
    Stream,
}

impl FromStr for InsertStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buffer" => Ok(InsertStrategy::Buffer),
            "stream" => Ok(InsertStrategy::Stream),
            other => Err(format!("expected `buffer` or `stream`, got `{other}`")),
        }
    }
}

impl fmt::Display for InsertStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InsertStrategy::Buffer => "buffer",
            InsertStrategy::Stream => "stream",
        })
    }
}

/// Create the blob table and store every `*.bin` file found in `dir`.
///
/// Exactly `n_files` files must be present. Returns the number of records
/// written.
pub fn populate_store(
    store: &dyn BlobStore,
    dir: &Path,
    n_files: usize,
    strategy: InsertStrategy,
) -> Result<usize, PopulationError> {
    store.create_schema().map_err(PopulationError::Schema)?;

    let pattern = format!(
        "{}/*.{TEST_FILE_EXTENSION}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let test_files = glob::glob(&pattern)?
        .collect::<Result<Vec<_>, _>>()?;
    if test_files.len() != n_files {
        return Err(PopulationError::CountMismatch {
            expected: n_files,
            found: test_files.len(),
        });
    }

    for path in &test_files {
        insert_file(store, path, strategy)?;
        log::info!("stored {} in database", path.display());
    }

    Ok(test_files.len())
}

fn insert_file(
    store: &dyn BlobStore,
    path: &Path,
    strategy: InsertStrategy,
) -> Result<(), PopulationError> {
    let source_err = |source| PopulationError::Source {
        path: path.to_path_buf(),
        source,
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let insert_err = |source| PopulationError::Insert {
        name: name.clone(),
        source,
    };

    let (expected, written) = match strategy {
        InsertStrategy::Buffer => {
            let data = fs::read(path).map_err(source_err)?;
            let rows = store.insert(&name, &data).map_err(insert_err)?;
            if rows != 1 {
                return Err(PopulationError::RowsAffected { name, rows });
            }
            (data.len() as u64, data.len() as u64)
        }
        InsertStrategy::Stream => {
            let mut file = File::open(path).map_err(source_err)?;
            let size = file.metadata().map_err(source_err)?.len();
            let written = store
                .insert_streamed(&name, size, &mut file)
                .map_err(insert_err)?;
            (size, written)
        }
    };

    if written != expected {
        return Err(PopulationError::ShortWrite {
            name,
            expected,
            written,
        });
    }
    Ok(())
}
