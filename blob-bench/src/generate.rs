//! Test data generation: random files of random size on disk.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use bench_core::constants::{test_file_name, WRITE_CHUNK_SIZE};
use rand::Rng;

use crate::error::{ConfigError, GenerationError};

/// Half-open byte size range `[min, max)` with `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRange {
    min: u64,
    max: u64,
}

impl SizeRange {
    pub fn new(min: u64, max: u64) -> Result<Self, ConfigError> {
        if min >= max {
            return Err(ConfigError::SizeRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn contains(&self, size: u64) -> bool {
        (self.min..self.max).contains(&size)
    }

    fn as_range(&self) -> Range<u64> {
        self.min..self.max
    }
}

/// A generated file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFile {
    pub index: usize,
    pub path: PathBuf,
    pub size: u64,
}

/// Create `n_files` files named `0.bin`, `1.bin`, ... in `dir`.
///
/// Each file gets a size drawn from `sizes` and random content. Data is
/// produced and written one chunk of at most [`WRITE_CHUNK_SIZE`] bytes at a
/// time. Existing files are never overwritten.
pub fn generate_files<R: Rng>(
    dir: &Path,
    n_files: usize,
    sizes: SizeRange,
    rng: &mut R,
) -> Result<Vec<TestFile>, GenerationError> {
    let mut chunk = Vec::new();
    let mut files = Vec::with_capacity(n_files);

    for index in 0..n_files {
        let size = rng.gen_range(sizes.as_range());
        let path = dir.join(test_file_name(index));
        let mut file = create_exclusive(&path)?;

        let mut remaining = size;
        while remaining > 0 {
            let n = remaining.min(WRITE_CHUNK_SIZE as u64) as usize;
            if chunk.len() < n {
                chunk.resize(n, 0);
            }
            rng.try_fill_bytes(&mut chunk[..n])
                .map_err(|source| GenerationError::RandomSource {
                    path: path.clone(),
                    source,
                })?;
            file.write_all(&chunk[..n])
                .map_err(|source| GenerationError::Write {
                    path: path.clone(),
                    source,
                })?;
            remaining -= n as u64;
        }
        file.flush().map_err(|source| GenerationError::Write {
            path: path.clone(),
            source,
        })?;

        log::info!("created testfile: {}", path.display());
        files.push(TestFile { index, path, size });
    }

    Ok(files)
}

fn create_exclusive(path: &Path) -> Result<File, GenerationError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path).map_err(|source| match source.kind() {
        io::ErrorKind::AlreadyExists => GenerationError::AlreadyExists {
            path: path.to_path_buf(),
        },
        _ => GenerationError::Create {
            path: path.to_path_buf(),
            source,
        },
    })
}
