//! # Optimizer Module
//!
//! Turns one accepted image into one smaller image in a modern format.
//!
//! ## Pipeline Stages
//! 1. **Orientation** - read the EXIF orientation tag (failures are ignored)
//! 2. **Decode** - decode the file bytes into a bitmap
//! 3. **Size** - compute the target size (downscale only, aspect preserved)
//! 4. **Normalize** - draw through the orientation transform into a native-size source surface
//! 5. **Scale** - Lanczos3 resample into the destination surface, then sharpen
//! 6. **Encode** - WebP directly from the destination, AVIF from a readback copy
//!
//! ## Example
//! ```rust,ignore
//! use image_squeeze::core::optimizer::{Optimizer, OptimizeOptions, OutputFormat};
//!
//! let optimizer = Optimizer::builder().build();
//! let result = optimizer.optimize(&candidate, &OptimizeOptions {
//!     max_width: 1280,
//!     format: OutputFormat::Avif,
//!     ..Default::default()
//! })?;
//! ```

mod decode;
mod dimensions;
mod encoder;
mod orientation;
mod pipeline;
mod resize;
mod surface;

pub use decode::decode_image;
pub use dimensions::target_size;
pub use encoder::{AvifEncoder, ImageEncoder, WebpEncoder};
pub use orientation::{read_exif_orientation, Orientation};
pub use pipeline::{optimize, Optimizer, OptimizerBuilder};
pub use resize::{HighQualityResizer, ResampleParams};
pub use surface::{PixelBudgetAllocator, SurfaceAllocator, SurfaceRole};

use crate::error::OptimizeError;
use serde::{Deserialize, Serialize};

/// Output formats the optimizer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Webp,
    Avif,
}

impl OutputFormat {
    /// File extension for outputs in this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Avif => "avif",
        }
    }

    /// MIME type for outputs in this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Webp => "image/webp",
            OutputFormat::Avif => "image/avif",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Per-run optimization settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizeOptions {
    /// Widest allowed output, in pixels. Narrower images keep their size.
    pub max_width: u32,
    pub format: OutputFormat,
    /// Encoder quality, 1-100
    pub quality: u8,
    /// Drop embedded metadata from the output.
    ///
    /// Outputs are always encoded from pixels alone, so metadata never
    /// survives; `false` is accepted but changes nothing.
    pub strip_metadata: bool,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            max_width: 1920,
            format: OutputFormat::Webp,
            quality: 80,
            strip_metadata: true,
        }
    }
}

impl OptimizeOptions {
    /// Reject settings the pipeline cannot honor
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.max_width == 0 {
            return Err(OptimizeError::InvalidOptions(
                "max width must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(OptimizeError::InvalidOptions(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// The optimized form of one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResult {
    /// Output file name (original base name + new extension)
    pub name: String,
    pub original_name: String,
    pub original_size: u64,
    pub optimized_size: u64,
    /// Encoded output bytes
    #[serde(skip)]
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Decoded size before orientation and scaling
    pub original_width: u32,
    pub original_height: u32,
    /// EXIF orientation (1-8) if it could be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exif_orientation: Option<u16>,
    pub processing_time_ms: u64,
    pub format: OutputFormat,
}

impl OptimizeResult {
    /// Bytes saved relative to the original (negative if the output grew)
    pub fn saved_bytes(&self) -> i64 {
        self.original_size as i64 - self.optimized_size as i64
    }

    /// Savings as a percentage of the original size
    pub fn savings_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.saved_bytes() as f64 / self.original_size as f64 * 100.0
    }
}

/// Build the output name: strip the last extension, append the format's.
pub fn output_name(original: &str, format: OutputFormat) -> String {
    let base = match original.rfind('.') {
        Some(pos) if pos + 1 < original.len() && !original[pos + 1..].contains('/') => {
            &original[..pos]
        }
        _ => original,
    };
    format!("{}.{}", base, format.extension())
}
