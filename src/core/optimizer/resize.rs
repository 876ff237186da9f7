//! High-quality downscaling.
//!
//! Uses fast_image_resize (SIMD convolution) for the resample and a light
//! unsharp mask afterwards to recover edge detail lost to filtering.

use super::SurfaceRole;
use crate::error::OptimizeError;
use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{imageops, RgbaImage};

/// Resampling and sharpening parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleParams {
    /// Convolution filter
    pub filter: FilterType,
    /// Sharpening strength in percent (0 disables sharpening)
    pub unsharp_amount: u32,
    /// Gaussian radius (sigma) of the sharpening blur
    pub unsharp_radius: f32,
    /// Minimum per-channel difference, 0-255, before a pixel is sharpened
    pub unsharp_threshold: u8,
}

impl Default for ResampleParams {
    /// Tuned for photographs
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
            unsharp_amount: 80,
            unsharp_radius: 0.6,
            unsharp_threshold: 2,
        }
    }
}

/// Fills destination surfaces with resampled copies of source surfaces
pub struct HighQualityResizer {
    resizer: Resizer,
}

impl HighQualityResizer {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Resample `source` into `destination` (whose size is the target size),
    /// then sharpen the result.
    pub fn resample(
        &mut self,
        source: &RgbaImage,
        destination: &mut RgbaImage,
        params: &ResampleParams,
    ) -> Result<(), OptimizeError> {
        let (dst_width, dst_height) = destination.dimensions();
        let surface_error = |role: SurfaceRole, width: u32, height: u32, reason: String| {
            OptimizeError::Surface {
                role,
                width,
                height,
                reason,
            }
        };

        let src_view = ImageRef::new(
            source.width(),
            source.height(),
            source.as_raw(),
            PixelType::U8x4,
        )
        .map_err(|e| {
            surface_error(
                SurfaceRole::Source,
                source.width(),
                source.height(),
                e.to_string(),
            )
        })?;

        {
            let dst_buffer: &mut [u8] = destination;
            let mut dst_view =
                Image::from_slice_u8(dst_width, dst_height, dst_buffer, PixelType::U8x4)
                    .map_err(|e| {
                        surface_error(SurfaceRole::Destination, dst_width, dst_height, e.to_string())
                    })?;

            let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(params.filter));

            self.resizer
                .resize(&src_view, &mut dst_view, &options)
                .map_err(|e| {
                    surface_error(
                        SurfaceRole::Destination,
                        dst_width,
                        dst_height,
                        format!("Resize failed: {}", e),
                    )
                })?;
        }

        unsharp_mask(destination, params);
        Ok(())
    }
}

impl Default for HighQualityResizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Sharpen color channels in place; alpha is left untouched.
fn unsharp_mask(image: &mut RgbaImage, params: &ResampleParams) {
    if params.unsharp_amount == 0 || params.unsharp_radius <= 0.0 {
        return;
    }

    let blurred = imageops::blur(&*image, params.unsharp_radius);
    let amount = params.unsharp_amount as f32 / 100.0;
    let threshold = params.unsharp_threshold as i16;

    for (pixel, soft) in image.pixels_mut().zip(blurred.pixels()) {
        for channel in 0..3 {
            let original = pixel.0[channel] as i16;
            let diff = original - soft.0[channel] as i16;
            if diff.abs() < threshold {
                continue;
            }
            let sharpened = original as f32 + diff as f32 * amount;
            pixel.0[channel] = sharpened.round().clamp(0.0, 255.0) as u8;
        }
    }
}
