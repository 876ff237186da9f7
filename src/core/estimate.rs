//! Up-front savings estimates.
//!
//! Heuristic only: assumes a typical 800 KB, 2048 px wide photo and scales
//! it by a per-format quality factor and the quadratic area reduction of
//! the resize. No image is read.

use crate::core::optimizer::{OptimizeOptions, OutputFormat};
use serde::Serialize;

/// Assumed size of a typical input image
pub const AVERAGE_IMAGE_SIZE_KB: f64 = 800.0;

/// Assumed width of a typical input image
pub const AVERAGE_IMAGE_WIDTH: u32 = 2048;

/// Factor used when the quality is not one of the tabulated steps
const FALLBACK_FACTOR: f64 = 0.75;

/// Output size relative to input, by quality step
const WEBP_FACTORS: [(u8, f64); 10] = [
    (100, 0.95),
    (90, 0.85),
    (80, 0.75),
    (70, 0.65),
    (60, 0.55),
    (50, 0.45),
    (40, 0.35),
    (30, 0.25),
    (20, 0.15),
    (10, 0.08),
];

const AVIF_FACTORS: [(u8, f64); 10] = [
    (100, 0.9),
    (90, 0.8),
    (80, 0.7),
    (70, 0.6),
    (60, 0.5),
    (50, 0.4),
    (40, 0.3),
    (30, 0.2),
    (20, 0.12),
    (10, 0.06),
];

/// Estimated effect of a set of options on a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationEstimate {
    pub original_size_mb: f64,
    pub estimated_size_mb: f64,
    pub savings_mb: f64,
    pub savings_percent: f64,
    pub compression_ratio: f64,
}

/// Effect of the width limit alone
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeImpact {
    pub original_width: u32,
    pub new_width: u32,
    /// Percentage of pixel area removed, rounded
    pub area_reduction: f64,
}

/// One row of the compression comparison table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionStat {
    pub format: OutputFormat,
    pub quality: u8,
    pub reduction_factor: f64,
}

/// Output size relative to input for a format and exact quality step
pub fn compression_factor(format: OutputFormat, quality: u8) -> f64 {
    let table = match format {
        OutputFormat::Webp => &WEBP_FACTORS,
        OutputFormat::Avif => &AVIF_FACTORS,
    };
    table
        .iter()
        .find(|(step, _)| *step == quality)
        .map(|(_, factor)| *factor)
        .unwrap_or(FALLBACK_FACTOR)
}

/// Byte-size factor of downscaling a typical image to `max_width`
fn resize_factor(max_width: u32) -> f64 {
    if max_width >= AVERAGE_IMAGE_WIDTH {
        return 1.0;
    }
    (max_width as f64 / AVERAGE_IMAGE_WIDTH as f64).powi(2)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimate savings for `image_count` typical images
pub fn estimate_optimization(options: &OptimizeOptions, image_count: usize) -> OptimizationEstimate {
    let original_kb = AVERAGE_IMAGE_SIZE_KB * image_count as f64;
    let reduction =
        compression_factor(options.format, options.quality) * resize_factor(options.max_width);
    let estimated_kb = original_kb * reduction;
    let savings_kb = original_kb - estimated_kb;

    let savings_percent = if original_kb > 0.0 {
        savings_kb / original_kb * 100.0
    } else {
        0.0
    };

    OptimizationEstimate {
        original_size_mb: round2(original_kb / 1024.0),
        estimated_size_mb: round2(estimated_kb / 1024.0),
        savings_mb: round2(savings_kb / 1024.0),
        savings_percent: savings_percent.round(),
        compression_ratio: round2(original_kb / estimated_kb.max(1.0)),
    }
}

/// One-sentence description of an estimate.
///
/// `estimate` must come from [`estimate_optimization`] with the same
/// `image_count`; its figures are already batch totals.
pub fn estimate_explanation(estimate: &OptimizationEstimate, image_count: usize) -> String {
    if image_count == 1 {
        return format!(
            "With these settings a typical {} MB image would shrink to about {} MB, saving {} MB ({}%).",
            estimate.original_size_mb,
            estimate.estimated_size_mb,
            estimate.savings_mb,
            estimate.savings_percent
        );
    }

    format!(
        "With {} images the total would go from {:.1} MB to {:.1} MB, saving {:.1} MB ({}%).",
        image_count,
        estimate.original_size_mb,
        estimate.estimated_size_mb,
        estimate.savings_mb,
        estimate.savings_percent
    )
}

/// How much of a typical image's area a width limit removes
pub fn resize_impact(max_width: u32) -> ResizeImpact {
    let new_width = max_width.min(AVERAGE_IMAGE_WIDTH);
    let scale = new_width as f64 / AVERAGE_IMAGE_WIDTH as f64;

    ResizeImpact {
        original_width: AVERAGE_IMAGE_WIDTH,
        new_width,
        area_reduction: ((1.0 - scale.powi(2)) * 100.0).round(),
    }
}

/// Factors for qualities 50-100 of both formats, smallest output first
pub fn compression_stats() -> Vec<CompressionStat> {
    let mut stats: Vec<CompressionStat> = [OutputFormat::Webp, OutputFormat::Avif]
        .into_iter()
        .flat_map(|format| {
            [100u8, 90, 80, 70, 60, 50].into_iter().map(move |quality| CompressionStat {
                format,
                quality,
                reduction_factor: compression_factor(format, quality),
            })
        })
        .collect();

    stats.sort_by(|a, b| a.reduction_factor.total_cmp(&b.reduction_factor));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(max_width: u32, format: OutputFormat, quality: u8) -> OptimizeOptions {
        OptimizeOptions {
            max_width,
            format,
            quality,
            ..Default::default()
        }
    }

    #[test]
    fn default_options_single_image() {
        let estimate = estimate_optimization(&OptimizeOptions::default(), 1);

        // 800 KB * 0.75 * (1920/2048)^2
        assert_eq!(estimate.original_size_mb, 0.78);
        assert_eq!(estimate.estimated_size_mb, 0.51);
        assert_eq!(estimate.savings_mb, 0.27);
        assert_eq!(estimate.savings_percent, 34.0);
        assert_eq!(estimate.compression_ratio, 1.52);
    }

    #[test]
    fn wide_limit_applies_compression_only() {
        let estimate = estimate_optimization(&options(4096, OutputFormat::Avif, 50), 10);

        assert_eq!(estimate.original_size_mb, 7.81);
        assert_eq!(estimate.savings_percent, 60.0);
        assert_eq!(estimate.compression_ratio, 2.5);
    }

    #[test]
    fn untabulated_quality_falls_back() {
        assert_eq!(compression_factor(OutputFormat::Webp, 85), 0.75);
        assert_eq!(compression_factor(OutputFormat::Avif, 1), 0.75);
        assert_eq!(compression_factor(OutputFormat::Avif, 20), 0.12);
    }

    #[test]
    fn zero_images_saves_nothing() {
        let estimate = estimate_optimization(&OptimizeOptions::default(), 0);
        assert_eq!(estimate.original_size_mb, 0.0);
        assert_eq!(estimate.savings_percent, 0.0);
        assert_eq!(estimate.compression_ratio, 0.0);
    }

    #[test]
    fn resize_impact_is_quadratic() {
        let impact = resize_impact(1024);
        assert_eq!(impact.new_width, 1024);
        assert_eq!(impact.area_reduction, 75.0);

        let none = resize_impact(4000);
        assert_eq!(none.new_width, 2048);
        assert_eq!(none.area_reduction, 0.0);
    }

    #[test]
    fn explanation_reports_batch_totals_once() {
        let estimate = estimate_optimization(&options(2048, OutputFormat::Webp, 50), 4);
        let text = estimate_explanation(&estimate, 4);
        assert_eq!(
            text,
            "With 4 images the total would go from 3.1 MB to 1.4 MB, saving 1.7 MB (55%)."
        );

        let single = estimate_explanation(&estimate_optimization(&OptimizeOptions::default(), 1), 1);
        assert!(single.contains("typical 0.78 MB image"));
    }

    #[test]
    fn compression_stats_sorted_ascending() {
        let stats = compression_stats();
        assert_eq!(stats.len(), 12);
        assert_eq!(stats[0].format, OutputFormat::Avif);
        assert_eq!(stats[0].quality, 50);
        assert!(stats.windows(2).all(|w| w[0].reduction_factor <= w[1].reduction_factor));
    }
}
