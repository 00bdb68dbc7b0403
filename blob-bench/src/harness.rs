//! One complete benchmark run: workspace, test data, store, both phases,
//! cleanup.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::BenchConfig;
use crate::engine::run_benchmark;
use crate::error::BenchError;
use crate::generate::generate_files;
use crate::populate::populate_store;
use crate::reader::{BlobReader, FsReader, StoreReader};
use crate::report::RunReport;
use crate::store::{BlobStore, SqliteBlobStore};
use crate::workspace::Workspace;

/// Run the filesystem phase and then the SQLite phase as configured.
///
/// The temporary artifacts are removed whether or not the run succeeded. A
/// cleanup failure takes precedence over the run's own result.
pub fn run(config: &BenchConfig) -> Result<RunReport, BenchError> {
    let workspace = Workspace::create(&config.work_dir)?;
    let outcome = run_in(&workspace, config);
    let cleanup = workspace.remove();

    match (outcome, cleanup) {
        (outcome, Ok(())) => outcome,
        (outcome, Err(cleanup_err)) => {
            if let Err(run_err) = outcome {
                log::error!("run failed before cleanup: {run_err}");
            }
            Err(cleanup_err.into())
        }
    }
}

fn run_in(workspace: &Workspace, config: &BenchConfig) -> Result<RunReport, BenchError> {
    let mut rng = match config.seed {
        Some(seed) => {
            log::info!("seeding test data generator with {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    generate_files(
        workspace.files_dir(),
        config.n_files,
        config.sizes,
        &mut rng,
    )?;

    // On success the last reference to the store drops at the end of this
    // function, closing every pooled connection before the database file is
    // removed. Workers left behind by a failed phase may still hold it.
    let store: Arc<dyn BlobStore> =
        Arc::new(SqliteBlobStore::open(workspace.db_path(), config.pool_size)?);
    log::info!("populating store ({} insert)", config.insert);
    populate_store(
        store.as_ref(),
        workspace.files_dir(),
        config.n_files,
        config.insert,
    )?;

    let readers: Vec<Arc<dyn BlobReader>> = vec![
        Arc::new(FsReader::new(workspace.files_dir())),
        Arc::new(StoreReader::new(store)),
    ];
    Ok(run_benchmark(&readers, config.concurrency, config.n_files)?)
}
