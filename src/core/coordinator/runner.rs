//! Sequential, all-or-nothing batch execution.

use super::{CancellationToken, ProgressEntry, SavingsSummary};
use crate::core::optimizer::{OptimizeOptions, OptimizeResult, Optimizer};
use crate::core::validation::Candidate;
use crate::error::ProcessError;
use crate::events::{Event, EventSender, ProcessEvent};
use std::time::Instant;

/// Optimize `files` one after another, in order.
///
/// Stops at the first failure and returns only the error for that file;
/// results gathered before it are discarded. The token is checked before
/// each file.
pub fn process_batch(
    optimizer: &Optimizer,
    files: &[Candidate],
    options: &OptimizeOptions,
    events: &EventSender,
    cancel: &CancellationToken,
) -> Result<Vec<OptimizeResult>, ProcessError> {
    let start = Instant::now();
    let mut results = Vec::with_capacity(files.len());

    for (index, file) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(completed = index, total = files.len(), "batch cancelled");
            events.send(Event::Process(ProcessEvent::Cancelled));
            return Err(ProcessError::Cancelled);
        }

        tracing::debug!(index, name = file.name(), "processing file");
        events.send(Event::Process(ProcessEvent::FileStarted {
            index,
            name: file.name().to_string(),
        }));

        match optimizer.optimize(file, options) {
            Ok(result) => {
                events.send(Event::Process(ProcessEvent::Progress(ProgressEntry {
                    name: file.name().to_string(),
                    progress: 100,
                })));
                results.push(result);
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(index, name = file.name(), error = %message, "batch stopped");
                events.send(Event::Process(ProcessEvent::FileFailed {
                    index,
                    name: file.name().to_string(),
                    message: message.clone(),
                }));
                return Err(ProcessError::FileFailed {
                    index,
                    name: file.name().to_string(),
                    message,
                });
            }
        }
    }

    let summary = SavingsSummary::from_results(&results);
    tracing::info!(
        files = results.len(),
        saved_bytes = summary.saved_bytes,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "batch complete"
    );
    events.send(Event::Process(ProcessEvent::Completed { summary }));

    Ok(results)
}
