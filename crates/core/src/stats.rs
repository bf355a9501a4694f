use crate::models::PlacementOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome counters shared by every in-flight task.
#[derive(Debug, Default)]
pub struct RunStatistics {
    copied: AtomicU64,
    moved: AtomicU64,
    skipped: AtomicU64,
    no_metadata: AtomicU64,
    failed: AtomicU64,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: PlacementOutcome) {
        let counter = match outcome {
            PlacementOutcome::Copied => &self.copied,
            PlacementOutcome::Moved => &self.moved,
            PlacementOutcome::Skipped => &self.skipped,
            PlacementOutcome::NoMetadata => &self.no_metadata,
            PlacementOutcome::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Only meaningful once every task has been joined.
    pub fn snapshot(&self) -> RunSummary {
        RunSummary {
            copied: self.copied.load(Ordering::Relaxed),
            moved: self.moved.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            no_metadata: self.no_metadata.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub copied: u64,
    pub moved: u64,
    pub skipped: u64,
    pub no_metadata: u64,
    pub failed: u64,
}

impl RunSummary {
    pub fn total(&self) -> u64 {
        self.copied + self.moved + self.skipped + self.no_metadata + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Copied: {}, Moved: {}, Skipped: {}, Without metadata: {}, Failed: {}",
            self.copied, self.moved, self.skipped, self.no_metadata, self.failed
        )
    }
}
