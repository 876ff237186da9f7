//! Batch validation against intake limits.

use super::{plural, Candidate, Limits, RejectedFile, RejectionReason, ValidationOutcome, ValidationStats};
use crate::events::{Event, EventSender, ValidationEvent};

/// Media types accepted without relying on the `image/` prefix
const KNOWN_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/avif",
    "image/bmp",
    "image/svg+xml",
];

/// Check whether a declared media type is an image type
pub fn is_image_type(media_type: &str) -> bool {
    KNOWN_IMAGE_TYPES.contains(&media_type) || media_type.starts_with("image/")
}

/// Format a byte count for display ("0 Bytes", "1.5 KB", "12 MB")
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    while unit < UNITS.len() - 1 && bytes >= 1024u64.pow(unit as u32 + 1) {
        unit += 1;
    }

    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// Classify a batch of candidates against the given limits.
///
/// Pure function: no I/O, candidates are never read or modified.
pub fn validate(files: &[Candidate], limits: &Limits) -> ValidationOutcome {
    let total_size: u64 = files.iter().map(Candidate::size).sum();
    let mut outcome = ValidationOutcome {
        stats: ValidationStats {
            total_files: files.len(),
            total_size,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut working_set = files;
    // Reported after the checked files to keep submission order.
    let mut truncated = Vec::new();

    if files.len() > limits.max_files {
        if !limits.auto_filter {
            return reject_whole_batch(files, limits, outcome);
        }

        outcome.warnings.push(format!(
            "You selected {} files, but the limit is {}. Only the first {} files will be processed.",
            files.len(),
            limits.max_files,
            limits.max_files
        ));

        let (kept, skipped) = files.split_at(limits.max_files);
        working_set = kept;
        for candidate in skipped {
            outcome.stats.rejected_size += candidate.size();
            truncated.push(RejectedFile {
                candidate: candidate.clone(),
                reason: RejectionReason::TotalCount,
                message: format!(
                    "\"{}\" is beyond the {}-file limit",
                    candidate.name(),
                    limits.max_files
                ),
            });
        }
    }

    let mut accumulated_size = 0u64;

    for candidate in working_set {
        match classify(candidate, limits, accumulated_size) {
            None => {
                accumulated_size += candidate.size();
                outcome.stats.valid_size += candidate.size();
                outcome.accepted.push(candidate.clone());
            }
            Some((reason, message)) => {
                if limits.show_warnings {
                    match reason {
                        RejectionReason::Size => outcome.warnings.push(format!(
                            "File too large: \"{}\" ({}) exceeds the {} limit",
                            candidate.name(),
                            format_bytes(candidate.size()),
                            format_bytes(limits.max_file_size)
                        )),
                        RejectionReason::TotalSize if !outcome.accepted.is_empty() => {
                            outcome.warnings.push(format!(
                                "Total size limit reached ({}). No more files can be processed.",
                                format_bytes(limits.max_total_size)
                            ))
                        }
                        _ => {}
                    }
                }

                outcome.stats.rejected_size += candidate.size();
                outcome.rejected.push(RejectedFile {
                    candidate: candidate.clone(),
                    reason,
                    message,
                });
            }
        }
    }

    outcome.rejected.extend(truncated);

    if outcome.accepted.is_empty() {
        if outcome.rejected.is_empty() {
            outcome.errors.push("No valid files were selected.".to_string());
        } else {
            outcome.errors.push(
                "None of the files could be processed. Please check the limits and file types."
                    .to_string(),
            );
        }
    }

    if !outcome.rejected.is_empty() && !outcome.accepted.is_empty() {
        let count = outcome.rejected.len();
        outcome.warnings.push(format!(
            "{} file{} {} rejected ({})",
            count,
            plural(count),
            if count == 1 { "was" } else { "were" },
            format_bytes(outcome.stats.rejected_size)
        ));
    }

    outcome.stats.valid_files = outcome.accepted.len();
    outcome.stats.rejected_files = outcome.rejected.len();

    tracing::debug!(
        total = outcome.stats.total_files,
        valid = outcome.stats.valid_files,
        rejected = outcome.stats.rejected_files,
        "validated batch"
    );

    outcome
}

/// Validate and report the outcome as a [`ValidationEvent::Completed`]
pub fn validate_with_events(
    files: &[Candidate],
    limits: &Limits,
    events: &EventSender,
) -> ValidationOutcome {
    let outcome = validate(files, limits);
    events.send(Event::Validation(ValidationEvent::Completed {
        stats: outcome.stats,
        warnings: outcome.warnings.clone(),
        errors: outcome.errors.clone(),
    }));
    outcome
}

/// Apply the per-file checks in order: type, size, cumulative size.
fn classify(
    candidate: &Candidate,
    limits: &Limits,
    accumulated_size: u64,
) -> Option<(RejectionReason, String)> {
    if !is_image_type(candidate.media_type()) {
        return Some((
            RejectionReason::Type,
            format!("\"{}\" is not a valid image", candidate.name()),
        ));
    }

    if candidate.size() > limits.max_file_size {
        return Some((
            RejectionReason::Size,
            format!(
                "\"{}\" ({}) exceeds the {} limit",
                candidate.name(),
                format_bytes(candidate.size()),
                format_bytes(limits.max_file_size)
            ),
        ));
    }

    if accumulated_size + candidate.size() > limits.max_total_size {
        return Some((
            RejectionReason::TotalSize,
            format!(
                "\"{}\" would exceed the maximum total size of {}",
                candidate.name(),
                format_bytes(limits.max_total_size)
            ),
        ));
    }

    None
}

/// Too many files and no auto-filter: every candidate is rejected, no per-file checks run.
fn reject_whole_batch(
    files: &[Candidate],
    limits: &Limits,
    mut outcome: ValidationOutcome,
) -> ValidationOutcome {
    outcome.errors.push(format!(
        "Too many files: {} files (limit: {})",
        files.len(),
        limits.max_files
    ));
    outcome.rejected = files
        .iter()
        .map(|candidate| RejectedFile {
            candidate: candidate.clone(),
            reason: RejectionReason::TotalCount,
            message: "Exceeds the maximum number of files".to_string(),
        })
        .collect();
    outcome.stats.rejected_files = files.len();
    outcome.stats.rejected_size = outcome.stats.total_size;
    outcome
}
