//! Savings statistics for a finished batch.

use crate::core::optimizer::OptimizeResult;
use serde::{Deserialize, Serialize};

/// Totals across every result of a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsSummary {
    pub file_count: usize,
    pub original_bytes: u64,
    pub optimized_bytes: u64,
    /// Negative when the outputs are larger than the inputs
    pub saved_bytes: i64,
    pub savings_percent: f64,
    pub processing_time_ms: u64,
}

impl SavingsSummary {
    pub fn from_results(results: &[OptimizeResult]) -> Self {
        let original_bytes: u64 = results.iter().map(|r| r.original_size).sum();
        let optimized_bytes: u64 = results.iter().map(|r| r.optimized_size).sum();
        let saved_bytes = original_bytes as i64 - optimized_bytes as i64;

        let savings_percent = if original_bytes == 0 {
            0.0
        } else {
            saved_bytes as f64 / original_bytes as f64 * 100.0
        };

        Self {
            file_count: results.len(),
            original_bytes,
            optimized_bytes,
            saved_bytes,
            savings_percent,
            processing_time_ms: results.iter().map(|r| r.processing_time_ms).sum(),
        }
    }
}
