//! Temporary artifacts of one run: the test file directory and the database
//! file. Both must be removed at the end of the run; failing to remove them
//! is an error, not something to ignore.

use std::path::{Path, PathBuf};

use bench_core::constants::{DB_SUFFIX, TEMP_PREFIX};
use tempfile::{NamedTempFile, TempDir};

use crate::error::{CleanupError, GenerationError};

pub struct Workspace {
    files_dir: TempDir,
    db_file: NamedTempFile,
}

impl Workspace {
    /// Create `sqlite-bench-*/` and `sqlite-bench-*.db` inside `parent`.
    pub fn create(parent: &Path) -> Result<Self, GenerationError> {
        let workspace_err = |source| GenerationError::Workspace {
            dir: parent.to_path_buf(),
            source,
        };

        let files_dir = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir_in(parent)
            .map_err(workspace_err)?;
        let db_file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(DB_SUFFIX)
            .tempfile_in(parent)
            .map_err(workspace_err)?;

        log::debug!(
            "workspace: files in {}, database {}",
            files_dir.path().display(),
            db_file.path().display()
        );
        Ok(Self { files_dir, db_file })
    }

    pub fn files_dir(&self) -> &Path {
        self.files_dir.path()
    }

    pub fn db_path(&self) -> &Path {
        self.db_file.path()
    }

    /// Delete the database file and the test file directory.
    ///
    /// Every connection to the database must be closed before this is called.
    pub fn remove(self) -> Result<(), CleanupError> {
        log::info!("removing testfiles...");

        let db_path: PathBuf = self.db_file.path().to_path_buf();
        let dir_path: PathBuf = self.files_dir.path().to_path_buf();

        let db_result = self.db_file.close();
        let dir_result = self.files_dir.close();

        db_result.map_err(|source| CleanupError::RemoveFile {
            path: db_path,
            source,
        })?;
        dir_result.map_err(|source| CleanupError::RemoveDir {
            path: dir_path,
            source,
        })
    }
}
