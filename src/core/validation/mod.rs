//! # Validation Module
//!
//! Decides which submitted files are admissible for optimization and why
//! the others are not.
//!
//! ## Checks (first match wins)
//! 1. **Type** - declared media type must be an image type
//! 2. **Size** - each file must fit under `max_file_size`
//! 3. **Cumulative size** - admitted files together must fit under `max_total_size`
//!
//! A batch larger than `max_files` is either truncated (`auto_filter`)
//! or rejected as a whole.
//!
//! ## Example
//! ```rust,ignore
//! use image_squeeze::core::validation::{validate, Limits};
//!
//! let outcome = validate(&candidates, &Limits::default());
//! for rejected in &outcome.rejected {
//!     println!("{}: {}", rejected.reason, rejected.message);
//! }
//! ```

mod candidate;
mod validator;

pub use candidate::{media_type_for_extension, Candidate, CandidateSource};
pub use validator::{format_bytes, is_image_type, validate, validate_with_events};

use serde::{Deserialize, Serialize};

/// One mebibyte
pub const MIB: u64 = 1024 * 1024;

/// Intake limits applied to a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Limits {
    /// Largest accepted single file, in bytes
    pub max_file_size: u64,
    /// Largest accepted batch, in files
    pub max_files: usize,
    /// Largest cumulative size of admitted files, in bytes
    pub max_total_size: u64,
    /// Truncate an oversized batch instead of rejecting all of it
    pub auto_filter: bool,
    /// Emit per-file warnings
    pub show_warnings: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size: 12 * MIB,
            max_files: 10,
            max_total_size: 60 * MIB,
            auto_filter: true,
            show_warnings: true,
        }
    }
}

/// Why a candidate was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Larger than `max_file_size`
    Size,
    /// Not an image media type
    Type,
    /// Outside the `max_files` window
    TotalCount,
    /// Would push the admitted total over `max_total_size`
    TotalSize,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::Size => write!(f, "size"),
            RejectionReason::Type => write!(f, "type"),
            RejectionReason::TotalCount => write!(f, "total_count"),
            RejectionReason::TotalSize => write!(f, "total_size"),
        }
    }
}

/// A candidate that did not pass validation
#[derive(Debug, Clone)]
pub struct RejectedFile {
    pub candidate: Candidate,
    pub reason: RejectionReason,
    pub message: String,
}

/// Counts and byte sums for a validated batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStats {
    pub total_files: usize,
    pub valid_files: usize,
    pub rejected_files: usize,
    pub total_size: u64,
    pub valid_size: u64,
    pub rejected_size: u64,
}

/// Result of validating a batch
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    /// Admitted candidates, in submission order
    pub accepted: Vec<Candidate>,
    /// Turned-away candidates, in submission order
    pub rejected: Vec<RejectedFile>,
    /// Batch-fatal messages
    pub errors: Vec<String>,
    /// Informational messages
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

impl ValidationOutcome {
    /// True when nothing can be processed
    pub fn is_fatal(&self) -> bool {
        !self.errors.is_empty()
    }

    /// One-line description of the outcome
    pub fn summary(&self) -> String {
        let stats = &self.stats;

        if stats.valid_files == 0 {
            return "No files could be validated".to_string();
        }

        if stats.rejected_files == 0 {
            return format!(
                "{} valid file{} ({})",
                stats.valid_files,
                plural(stats.valid_files),
                format_bytes(stats.valid_size)
            );
        }

        format!("{} valid, {} rejected", stats.valid_files, stats.rejected_files)
    }
}

pub(crate) fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_file_size, 12 * MIB);
        assert_eq!(limits.max_files, 10);
        assert_eq!(limits.max_total_size, 60 * MIB);
        assert!(limits.auto_filter);
        assert!(limits.show_warnings);
    }

    #[test]
    fn limits_deserialize_with_defaults() {
        let limits: Limits = serde_json::from_str(r#"{"maxFiles": 3}"#).unwrap();
        assert_eq!(limits.max_files, 3);
        assert_eq!(limits.max_file_size, 12 * MIB);
    }

    #[test]
    fn rejection_reason_display_matches_wire_name() {
        for reason in [
            RejectionReason::Size,
            RejectionReason::Type,
            RejectionReason::TotalCount,
            RejectionReason::TotalSize,
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason));
        }
    }

    #[test]
    fn summary_for_empty_outcome() {
        let outcome = ValidationOutcome::default();
        assert_eq!(outcome.summary(), "No files could be validated");
    }

    #[test]
    fn summary_mentions_rejections() {
        let outcome = ValidationOutcome {
            stats: ValidationStats {
                total_files: 3,
                valid_files: 2,
                rejected_files: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(outcome.summary(), "2 valid, 1 rejected");
    }

    #[test]
    fn summary_for_single_valid_file() {
        let outcome = ValidationOutcome {
            stats: ValidationStats {
                total_files: 1,
                valid_files: 1,
                valid_size: 2048,
                total_size: 2048,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(outcome.summary(), "1 valid file (2 KB)");
    }
}
