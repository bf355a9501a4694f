//! Bounded task dispatcher: an admission gate in front of blocking workers.

use crate::models::PlacementOutcome;
use crate::stats::RunStatistics;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::error;

/// Runs at most `limit` tasks at once. `submit` waits for a free slot, so a
/// single producer is held back while the gate is full.
pub struct Dispatcher {
    gate: Arc<Semaphore>,
    tasks: JoinSet<()>,
    stats: Arc<RunStatistics>,
    submitted: u64,
}

impl Dispatcher {
    pub fn new(limit: usize, stats: Arc<RunStatistics>) -> Self {
        Self {
            gate: Arc::new(Semaphore::new(limit.max(1))),
            tasks: JoinSet::new(),
            stats,
            submitted: 0,
        }
    }

    pub async fn submit<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // The gate is private to the dispatcher and never closed.
        let permit = self
            .gate
            .clone()
            .acquire_owned()
            .await
            .expect("admission gate closed");
        self.tasks.spawn_blocking(move || {
            // Released on return and on unwind alike.
            let _permit = permit;
            task();
        });
        self.submitted += 1;

        while let Some(done) = self.tasks.try_join_next() {
            self.settle(done);
        }
    }

    /// Waits for every submitted task; returns how many were submitted.
    pub async fn join(mut self) -> u64 {
        while let Some(done) = self.tasks.join_next().await {
            self.settle(done);
        }
        self.submitted
    }

    /// A task that panicked never recorded its outcome; count it here.
    fn settle(&self, done: Result<(), JoinError>) {
        if let Err(e) = done {
            error!(error = %e, "import task aborted");
            self.stats.record(PlacementOutcome::Failed);
        }
    }
}
