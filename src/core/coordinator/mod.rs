//! # Coordinator Module
//!
//! Runs batches of accepted candidates through the optimizer.
//!
//! ## Rules
//! - Files are processed **one at a time**, in submission order, so peak
//!   memory stays at roughly one image's working set.
//! - The first failing file ends the batch. No partial results are returned.
//! - Batches run on a dedicated worker thread; the caller gets a
//!   [`BatchHandle`] that resolves exactly once.
//!
//! ## Example
//! ```rust,ignore
//! use image_squeeze::core::coordinator::Coordinator;
//! use image_squeeze::core::optimizer::{Optimizer, OptimizeOptions};
//! use image_squeeze::events::null_sender;
//!
//! let coordinator = Coordinator::spawn(Optimizer::default())?;
//! let handle = coordinator.submit(accepted, OptimizeOptions::default(), null_sender());
//! let results = handle.wait()?;
//! ```

mod runner;
mod summary;
mod worker;

pub use runner::process_batch;
pub use summary::SavingsSummary;
pub use worker::{BatchHandle, Coordinator};

use crate::events::ProcessEvent;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress of one file, 0-100
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub name: String,
    pub progress: u8,
}

/// Shared flag checked by the worker before each file.
///
/// A file that is already being optimized always finishes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Caller-owned view of a running batch.
///
/// Feed it every [`ProcessEvent`] received for the batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchProgress {
    pub batch_id: Option<String>,
    pub total: usize,
    /// Per-file progress in submission order
    pub entries: Vec<ProgressEntry>,
    pub failed: Option<String>,
    pub summary: Option<SavingsSummary>,
    pub cancelled: bool,
}

impl BatchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the state from one event
    pub fn apply(&mut self, event: &ProcessEvent) {
        match event {
            ProcessEvent::Started { batch_id, files } => {
                *self = Self {
                    batch_id: Some(batch_id.clone()),
                    total: *files,
                    ..Default::default()
                };
            }
            ProcessEvent::FileStarted { name, .. } => self.set(name, 0),
            ProcessEvent::Progress(entry) => self.set(&entry.name, entry.progress),
            ProcessEvent::FileFailed { name, .. } => self.failed = Some(name.clone()),
            ProcessEvent::Completed { summary } => self.summary = Some(summary.clone()),
            ProcessEvent::Cancelled => self.cancelled = true,
        }
    }

    /// Number of files that reached 100%
    pub fn completed(&self) -> usize {
        self.entries.iter().filter(|e| e.progress >= 100).count()
    }

    /// True once the batch has completed, failed or been cancelled
    pub fn is_finished(&self) -> bool {
        self.summary.is_some() || self.failed.is_some() || self.cancelled
    }

    pub fn progress_of(&self, name: &str) -> Option<u8> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.progress)
    }

    fn set(&mut self, name: &str, progress: u8) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.progress = progress,
            None => self.entries.push(ProgressEntry {
                name: name.to_string(),
                progress,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(name: &str, progress: u8) -> ProcessEvent {
        ProcessEvent::Progress(ProgressEntry {
            name: name.to_string(),
            progress,
        })
    }

    #[test]
    fn token_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn batch_progress_tracks_files_by_name() {
        let mut state = BatchProgress::new();
        state.apply(&ProcessEvent::Started {
            batch_id: "b1".to_string(),
            files: 2,
        });
        state.apply(&ProcessEvent::FileStarted {
            index: 0,
            name: "a.jpg".to_string(),
        });
        state.apply(&progress("a.jpg", 100));
        state.apply(&ProcessEvent::FileStarted {
            index: 1,
            name: "b.jpg".to_string(),
        });

        assert_eq!(state.total, 2);
        assert_eq!(state.completed(), 1);
        assert_eq!(state.progress_of("a.jpg"), Some(100));
        assert_eq!(state.progress_of("b.jpg"), Some(0));
        assert_eq!(state.entries.len(), 2);
        assert!(!state.is_finished());
    }

    #[test]
    fn failure_finishes_the_batch() {
        let mut state = BatchProgress::new();
        state.apply(&ProcessEvent::FileFailed {
            index: 1,
            name: "bad.jpg".to_string(),
            message: "boom".to_string(),
        });

        assert!(state.is_finished());
        assert_eq!(state.failed.as_deref(), Some("bad.jpg"));
    }

    #[test]
    fn started_resets_previous_batch() {
        let mut state = BatchProgress::new();
        state.apply(&progress("old.jpg", 100));
        state.apply(&ProcessEvent::Cancelled);

        state.apply(&ProcessEvent::Started {
            batch_id: "b2".to_string(),
            files: 1,
        });

        assert!(state.entries.is_empty());
        assert!(!state.cancelled);
        assert_eq!(state.batch_id.as_deref(), Some("b2"));
    }
}
