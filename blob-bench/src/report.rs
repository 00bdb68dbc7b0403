//! Report module: per-phase latency samples and the run's result line.

use std::fmt;
use std::time::Duration;

/// Latencies of every read in one phase, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct LatencySamples {
    durations: Vec<Duration>,
}

impl LatencySamples {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            durations: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: Duration) {
        self.durations.push(sample);
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Sum of all samples: the time spent doing reads, across all workers.
    pub fn total(&self) -> Duration {
        self.durations.iter().sum()
    }
}

impl FromIterator<Duration> for LatencySamples {
    fn from_iter<I: IntoIterator<Item = Duration>>(iter: I) -> Self {
        Self {
            durations: iter.into_iter().collect(),
        }
    }
}

/// Summed result of one completed phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTotal {
    pub backend: &'static str,
    pub total: Duration,
    pub samples: usize,
}

impl PhaseTotal {
    pub fn from_samples(backend: &'static str, samples: &LatencySamples) -> Self {
        Self {
            backend,
            total: samples.total(),
            samples: samples.len(),
        }
    }
}

/// Totals of every phase of a run, in the order the phases ran.
///
/// Displays as the single result line, e.g.
/// `total: files: 1.2ms\tsql: 3.4ms`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    phases: Vec<PhaseTotal>,
}

impl RunReport {
    pub fn push(&mut self, phase: PhaseTotal) {
        self.phases.push(phase);
    }

    pub fn phases(&self) -> &[PhaseTotal] {
        &self.phases
    }

    pub fn total_for(&self, backend: &str) -> Option<Duration> {
        self.phases
            .iter()
            .find(|p| p.backend == backend)
            .map(|p| p.total)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("total:")?;
        for (i, phase) in self.phases.iter().enumerate() {
            let sep = if i == 0 { " " } else { "\t" };
            write!(f, "{sep}{}: {:?}", phase.backend, phase.total)?;
        }
        Ok(())
    }
}
