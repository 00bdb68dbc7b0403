//! Worker-pool benchmark engine.
//!
//! A phase runs `concurrency` worker threads against one [`BlobReader`].
//! Every worker reads `0.bin .. (n_files-1).bin` once, in order, timing each
//! read, and reports every sample or error over a shared channel followed by
//! a completion event. The phase driver collects until every worker is done
//! or the first error arrives.
//!
//! Workers are not cancelled when a sibling fails. The driver returns the
//! first error straight away, drops the channel, and the remaining workers
//! finish their reads in the background with their reports discarded.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bench_core::constants::test_file_name;

use crate::error::ReadError;
use crate::reader::BlobReader;
use crate::report::{LatencySamples, PhaseTotal, RunReport};

/// Lifecycle of one benchmark phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    NotStarted,
    /// Workers are being launched.
    Running,
    /// All workers launched; collecting their events.
    Draining,
    Completed,
    Failed,
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhaseState::NotStarted => "not started",
            PhaseState::Running => "running",
            PhaseState::Draining => "draining",
            PhaseState::Completed => "completed",
            PhaseState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What a worker reports back to the phase driver.
#[derive(Debug)]
pub enum WorkerEvent {
    /// One read finished; how long it took.
    Sample(Duration),
    /// One read failed.
    Failed(ReadError),
    /// The worker has finished all of its reads.
    Done,
}

/// One pass of all workers through all files on a single backend.
pub struct Phase {
    reader: Arc<dyn BlobReader>,
    concurrency: usize,
    n_files: usize,
    state: PhaseState,
}

impl Phase {
    pub fn new(reader: Arc<dyn BlobReader>, concurrency: usize, n_files: usize) -> Self {
        Self {
            reader,
            concurrency,
            n_files,
            state: PhaseState::NotStarted,
        }
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    pub fn backend(&self) -> &'static str {
        self.reader.backend()
    }

    /// Number of reads a successful run of this phase performs.
    pub fn task_count(&self) -> usize {
        self.concurrency * self.n_files
    }

    /// Launch the workers and collect their samples.
    ///
    /// On success every worker thread has been joined before this returns.
    /// On failure the workers are left running detached.
    pub fn run(&mut self) -> Result<LatencySamples, ReadError> {
        self.transition(PhaseState::Running);
        let result = self.launch().and_then(|(rx, workers)| {
            self.transition(PhaseState::Draining);
            let samples = self.drain(&rx)?;
            for worker in workers {
                worker.join().map_err(|_| ReadError::WorkerLost {
                    backend: self.backend(),
                })?;
            }
            Ok(samples)
        });

        match result {
            Ok(samples) => {
                debug_assert_eq!(samples.len(), self.task_count());
                self.transition(PhaseState::Completed);
                Ok(samples)
            }
            Err(err) => {
                self.transition(PhaseState::Failed);
                Err(err)
            }
        }
    }

    fn launch(&self) -> Result<(Receiver<WorkerEvent>, Vec<JoinHandle<()>>), ReadError> {
        let (tx, rx) = mpsc::channel();
        let mut workers = Vec::with_capacity(self.concurrency);
        for worker in 0..self.concurrency {
            let reader = Arc::clone(&self.reader);
            let tx = tx.clone();
            let n_files = self.n_files;
            let handle = thread::Builder::new()
                .name(format!("{}-worker-{worker}", self.backend()))
                .spawn(move || run_worker(reader.as_ref(), n_files, &tx))
                .map_err(|source| ReadError::Spawn {
                    backend: self.backend(),
                    source,
                })?;
            workers.push(handle);
        }
        // Only workers hold senders from here on, so a disconnect means a
        // worker went away without reporting `Done`.
        drop(tx);
        Ok((rx, workers))
    }

    fn drain(&self, rx: &Receiver<WorkerEvent>) -> Result<LatencySamples, ReadError> {
        let mut samples = LatencySamples::with_capacity(self.task_count());
        let mut running = self.concurrency;
        while running > 0 {
            match rx.recv() {
                Ok(WorkerEvent::Sample(d)) => samples.push(d),
                Ok(WorkerEvent::Done) => running -= 1,
                Ok(WorkerEvent::Failed(err)) => return Err(err),
                Err(_) => {
                    return Err(ReadError::WorkerLost {
                        backend: self.backend(),
                    })
                }
            }
        }
        Ok(samples)
    }

    fn transition(&mut self, next: PhaseState) {
        log::debug!("{} phase: {} -> {}", self.backend(), self.state, next);
        self.state = next;
    }
}

fn run_worker(reader: &dyn BlobReader, n_files: usize, tx: &Sender<WorkerEvent>) {
    for j in 0..n_files {
        let start = Instant::now();
        let name = test_file_name(j % n_files);
        let event = match reader.read(&name) {
            Ok(_) => WorkerEvent::Sample(start.elapsed()),
            Err(err) => WorkerEvent::Failed(err),
        };
        // The driver stops listening after the first error; keep going.
        let _ = tx.send(event);
    }
    let _ = tx.send(WorkerEvent::Done);
}

/// Run one phase per reader, strictly one after another, and total them.
///
/// The first failing phase aborts the run; later phases never start.
pub fn run_benchmark(
    readers: &[Arc<dyn BlobReader>],
    concurrency: usize,
    n_files: usize,
) -> Result<RunReport, ReadError> {
    let mut report = RunReport::default();
    for reader in readers {
        let mut phase = Phase::new(Arc::clone(reader), concurrency, n_files);
        log::info!(
            "{} phase: {} workers x {} reads",
            phase.backend(),
            concurrency,
            n_files
        );
        let samples = phase.run()?;
        let total = PhaseTotal::from_samples(phase.backend(), &samples);
        log::info!(
            "{} phase: {} samples, total {:?}",
            total.backend,
            total.samples,
            total.total
        );
        report.push(total);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every name it is asked for; fails on the names in `fail_on`.
    struct ScriptedReader {
        seen: Mutex<Vec<String>>,
        fail_on: HashSet<String>,
    }

    impl ScriptedReader {
        fn new(fail_on: &[&str]) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail_on: fail_on.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    impl BlobReader for ScriptedReader {
        fn backend(&self) -> &'static str {
            "scripted"
        }

        fn read(&self, name: &str) -> Result<u64, ReadError> {
            self.seen.lock().unwrap().push(name.to_string());
            if self.fail_on.contains(name) {
                return Err(ReadError::NotFound {
                    name: name.to_string(),
                });
            }
            thread::sleep(Duration::from_micros(50));
            Ok(1)
        }
    }

    #[test]
    fn completed_phase_has_one_sample_per_task() {
        let reader = Arc::new(ScriptedReader::new(&[]));
        let mut phase = Phase::new(reader.clone(), 3, 4);
        assert_eq!(phase.state(), PhaseState::NotStarted);

        let samples = phase.run().unwrap();

        assert_eq!(phase.state(), PhaseState::Completed);
        assert_eq!(samples.len(), 12);
        assert!(samples.total() > Duration::ZERO);
    }

    #[test]
    fn every_worker_reads_each_file_once() {
        let reader = Arc::new(ScriptedReader::new(&[]));
        Phase::new(reader.clone(), 2, 5).run().unwrap();

        let mut seen = reader.seen.lock().unwrap().clone();
        seen.sort();
        let mut expected: Vec<String> = (0..5)
            .flat_map(|i| [test_file_name(i), test_file_name(i)])
            .collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn first_error_fails_the_phase() {
        let reader = Arc::new(ScriptedReader::new(&["2.bin"]));
        let mut phase = Phase::new(reader, 4, 5);

        let err = phase.run().unwrap_err();

        assert_eq!(phase.state(), PhaseState::Failed);
        assert!(matches!(err, ReadError::NotFound { name } if name == "2.bin"));
    }

    #[test]
    fn zero_workers_complete_immediately() {
        let reader = Arc::new(ScriptedReader::new(&[]));
        let mut phase = Phase::new(reader, 0, 5);
        let samples = phase.run().unwrap();
        assert!(samples.is_empty());
        assert_eq!(phase.state(), PhaseState::Completed);
    }

    #[test]
    fn panicking_worker_is_reported_as_lost() {
        struct Panicky;
        impl BlobReader for Panicky {
            fn backend(&self) -> &'static str {
                "panicky"
            }
            fn read(&self, _name: &str) -> Result<u64, ReadError> {
                panic!("backend blew up");
            }
        }

        let err = Phase::new(Arc::new(Panicky), 1, 1).run().unwrap_err();
        assert!(matches!(err, ReadError::WorkerLost { backend: "panicky" }));
    }

    #[test]
    fn benchmark_runs_phases_in_order_and_stops_on_failure() {
        let bad = Arc::new(ScriptedReader::new(&["0.bin"]));
        let never = Arc::new(ScriptedReader::new(&[]));
        let readers = vec![
            Arc::new(ScriptedReader::new(&[])) as Arc<dyn BlobReader>,
            bad.clone() as Arc<dyn BlobReader>,
            never.clone() as Arc<dyn BlobReader>,
        ];

        assert!(run_benchmark(&readers, 2, 3).is_err());
        assert!(!bad.seen.lock().unwrap().is_empty());
        assert!(never.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn benchmark_reports_one_total_per_phase() {
        let readers = vec![
            Arc::new(ScriptedReader::new(&[])) as Arc<dyn BlobReader>,
            Arc::new(ScriptedReader::new(&[])) as Arc<dyn BlobReader>,
        ];
        let report = run_benchmark(&readers, 2, 3).unwrap();
        assert_eq!(report.phases().len(), 2);
        assert!(report.phases().iter().all(|p| p.samples == 6));
    }
}
