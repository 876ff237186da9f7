//! Event type definitions for progress reporting.

use crate::core::coordinator::{ProgressEntry, SavingsSummary};
use crate::core::validation::ValidationStats;
use serde::{Deserialize, Serialize};

/// All events emitted by the optimizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Intake validation events
    Validation(ValidationEvent),
    /// Batch processing events
    Process(ProcessEvent),
}

/// Events from the validation step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValidationEvent {
    /// A batch was validated
    Completed {
        stats: ValidationStats,
        warnings: Vec<String>,
        errors: Vec<String>,
    },
}

/// Events while a batch is being processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProcessEvent {
    /// A batch was picked up by the worker
    Started { batch_id: String, files: usize },
    /// A file is about to be optimized
    FileStarted { index: usize, name: String },
    /// Per-file progress, keyed by name
    Progress(ProgressEntry),
    /// A file failed and the batch stopped there
    FileFailed {
        index: usize,
        name: String,
        message: String,
    },
    /// Every file was optimized
    Completed { summary: SavingsSummary },
    /// The batch was cancelled between files
    Cancelled,
}
