//! Single-image optimization pipeline.

use super::{
    decode_image, output_name, read_exif_orientation, target_size, AvifEncoder, HighQualityResizer,
    ImageEncoder, OptimizeOptions, OptimizeResult, Orientation, OutputFormat,
    PixelBudgetAllocator, ResampleParams, SurfaceAllocator, SurfaceRole, WebpEncoder,
};
use crate::core::validation::Candidate;
use crate::error::OptimizeError;
use std::sync::Arc;
use std::time::Instant;

/// Builder for an [`Optimizer`]
pub struct OptimizerBuilder {
    allocator: Option<Arc<dyn SurfaceAllocator>>,
    webp: Option<Arc<dyn ImageEncoder>>,
    avif: Option<Arc<dyn ImageEncoder>>,
    resample: ResampleParams,
}

impl OptimizerBuilder {
    pub fn new() -> Self {
        Self {
            allocator: None,
            webp: None,
            avif: None,
            resample: ResampleParams::default(),
        }
    }

    /// Set the surface allocator
    pub fn allocator(mut self, allocator: Arc<dyn SurfaceAllocator>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    /// Set the encoder used for WebP output
    pub fn webp_encoder(mut self, encoder: Arc<dyn ImageEncoder>) -> Self {
        self.webp = Some(encoder);
        self
    }

    /// Set the encoder used for AVIF output
    pub fn avif_encoder(mut self, encoder: Arc<dyn ImageEncoder>) -> Self {
        self.avif = Some(encoder);
        self
    }

    /// Set resampling and sharpening parameters
    pub fn resample(mut self, params: ResampleParams) -> Self {
        self.resample = params;
        self
    }

    pub fn build(self) -> Optimizer {
        Optimizer {
            allocator: self
                .allocator
                .unwrap_or_else(|| Arc::new(PixelBudgetAllocator::default())),
            webp: self.webp.unwrap_or_else(|| Arc::new(WebpEncoder)),
            avif: self.avif.unwrap_or_else(|| Arc::new(AvifEncoder::default())),
            resample: self.resample,
        }
    }
}

impl Default for OptimizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns accepted candidates into optimized images.
///
/// Cheap to clone; all components are shared.
#[derive(Clone)]
pub struct Optimizer {
    allocator: Arc<dyn SurfaceAllocator>,
    webp: Arc<dyn ImageEncoder>,
    avif: Arc<dyn ImageEncoder>,
    resample: ResampleParams,
}

impl Optimizer {
    pub fn builder() -> OptimizerBuilder {
        OptimizerBuilder::new()
    }

    /// Optimize one candidate.
    ///
    /// A missing or unreadable EXIF orientation is not an error. Decode,
    /// surface and encode failures are.
    pub fn optimize(
        &self,
        candidate: &Candidate,
        options: &OptimizeOptions,
    ) -> Result<OptimizeResult, OptimizeError> {
        let start = Instant::now();
        options.validate()?;

        let bytes = candidate.read_bytes()?;
        let exif_orientation = read_exif_orientation(&bytes);
        let orientation = Orientation::from_exif(exif_orientation);

        let decoded = decode_image(candidate.name(), &bytes)?.to_rgba8();
        drop(bytes);
        let (original_width, original_height) = decoded.dimensions();

        let (width, height) = target_size(original_width, original_height, options.max_width);

        tracing::debug!(
            name = candidate.name(),
            original_width,
            original_height,
            width,
            height,
            ?orientation,
            "optimizing"
        );

        let mut source = self
            .allocator
            .acquire(SurfaceRole::Source, original_width, original_height)?;
        orientation.draw(&decoded, &mut source)?;
        drop(decoded);

        let mut destination = self
            .allocator
            .acquire(SurfaceRole::Destination, width, height)?;
        HighQualityResizer::new().resample(&source, &mut destination, &self.resample)?;
        drop(source);

        let data = match options.format {
            OutputFormat::Webp => {
                self.webp
                    .encode(destination.as_raw(), width, height, options.quality)?
            }
            OutputFormat::Avif => {
                let mut readback = self
                    .allocator
                    .acquire(SurfaceRole::Readback, width, height)?;
                readback.copy_from_slice(destination.as_raw());
                drop(destination);
                self.avif
                    .encode(readback.as_raw(), width, height, options.quality)?
            }
        };

        let result = OptimizeResult {
            name: output_name(candidate.name(), options.format),
            original_name: candidate.name().to_string(),
            original_size: candidate.size(),
            optimized_size: data.len() as u64,
            data,
            width,
            height,
            original_width,
            original_height,
            exif_orientation,
            processing_time_ms: start.elapsed().as_millis() as u64,
            format: options.format,
        };

        tracing::info!(
            name = %result.name,
            original_size = result.original_size,
            optimized_size = result.optimized_size,
            ms = result.processing_time_ms,
            "optimized"
        );

        Ok(result)
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        OptimizerBuilder::new().build()
    }
}

/// Optimize one candidate with the default allocator and encoders
pub fn optimize(
    candidate: &Candidate,
    options: &OptimizeOptions,
) -> Result<OptimizeResult, OptimizeError> {
    Optimizer::default().optimize(candidate, options)
}
