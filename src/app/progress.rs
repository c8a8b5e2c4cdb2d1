//! Run-scoped download progress tracking
//!
//! The tracker is an explicitly passed handle, not ambient state: the caller
//! that starts a run owns it, the coordinator updates it, and any number of
//! readers observe it. Counters are atomics so concurrently completing
//! workers can record progress without a lock, and every change is also
//! published on a watch channel so a streaming reader gets a cancellable
//! subscription with an explicit end-of-run marker instead of a polling
//! loop.
//!
//! Lifecycle: [`ProgressTracker::begin`] resets the counters for a run,
//! completions only ever increase them, and [`ProgressTracker::finish`]
//! freezes the final value. Progress counts download-phase work over the
//! selected chapter range only.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Point-in-time view of a run's progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// Completion percentage, 0–100; 0 when the run has no work
    pub percent: f64,
    /// Pages attempted so far (successes and failures both count)
    pub completed: u64,
    /// Total pages the run will attempt, fixed before the first fetch
    pub total: u64,
}

/// State published to progress subscribers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressUpdate {
    /// No run has started yet
    Idle,
    /// A run is underway
    Running(ProgressSnapshot),
    /// The run ended; this snapshot is final
    Finished(ProgressSnapshot),
}

/// Shared progress handle for one download run
#[derive(Debug)]
pub struct ProgressTracker {
    completed: AtomicU64,
    total: AtomicU64,
    updates: watch::Sender<ProgressUpdate>,
}

impl ProgressTracker {
    /// Create an idle tracker
    pub fn new() -> Self {
        let (updates, _) = watch::channel(ProgressUpdate::Idle);
        Self {
            completed: AtomicU64::new(0),
            total: AtomicU64::new(0),
            updates,
        }
    }

    /// Reset counters for a new run with the given total page count
    pub fn begin(&self, total: u64) {
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
        self.updates
            .send_replace(ProgressUpdate::Running(self.snapshot()));
    }

    /// Record one completed page fetch (success or failure)
    pub fn page_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.updates
            .send_replace(ProgressUpdate::Running(self.snapshot()));
    }

    /// Freeze the run at its current value and notify subscribers
    pub fn finish(&self) {
        self.updates
            .send_replace(ProgressUpdate::Finished(self.snapshot()));
    }

    /// Current counters as a snapshot
    pub fn snapshot(&self) -> ProgressSnapshot {
        let completed = self.completed.load(Ordering::SeqCst);
        let total = self.total.load(Ordering::SeqCst);
        let percent = if total == 0 {
            0.0
        } else {
            100.0 * completed as f64 / total as f64
        };
        ProgressSnapshot {
            percent,
            completed,
            total,
        }
    }

    /// Subscribe to progress updates
    ///
    /// The subscription sees the latest state immediately and ends when the
    /// run publishes [`ProgressUpdate::Finished`].
    pub fn subscribe(&self) -> watch::Receiver<ProgressUpdate> {
        self.updates.subscribe()
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
