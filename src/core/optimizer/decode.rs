//! Fast image decoding with format-specific optimizations.
//!
//! Uses zune-jpeg for JPEG data (1.5-2x faster than image crate),
//! falls back to image crate for other formats.

use crate::error::OptimizeError;
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, Rgb, Rgba};
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Decode file bytes into a bitmap using the fastest available decoder.
///
/// The format is sniffed from the content, not taken from the name.
pub fn decode_image(name: &str, bytes: &[u8]) -> Result<DynamicImage, OptimizeError> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => decode_jpeg(name, bytes).or_else(|e| {
            tracing::debug!("zune-jpeg failed for {}, falling back: {}", name, e);
            decode_fallback(name, bytes)
        }),
        _ => decode_fallback(name, bytes),
    }
}

/// Fast JPEG decoding using zune-jpeg
fn decode_jpeg(name: &str, bytes: &[u8]) -> Result<DynamicImage, OptimizeError> {
    let decode_error = |reason: String| OptimizeError::Decode {
        name: name.to_string(),
        reason,
    };

    let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
    let mut decoder = JpegDecoder::new_with_options(bytes, options);

    let pixels = decoder
        .decode()
        .map_err(|e| decode_error(format!("zune-jpeg decode failed: {:?}", e)))?;

    let info = decoder
        .info()
        .ok_or_else(|| decode_error("Failed to get image info".to_string()))?;

    let width = info.width as u32;
    let height = info.height as u32;

    // The decoder may not honor the requested colorspace (e.g. grayscale input)
    let out_colorspace = decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB);

    let image = match out_colorspace {
        ColorSpace::RGB => {
            let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, pixels)
                .ok_or_else(|| decode_error("Failed to create RGB buffer".to_string()))?;
            DynamicImage::ImageRgb8(buffer)
        }
        ColorSpace::RGBA => {
            let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, pixels)
                .ok_or_else(|| decode_error("Failed to create RGBA buffer".to_string()))?;
            DynamicImage::ImageRgba8(buffer)
        }
        ColorSpace::Luma => {
            let buffer: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, pixels)
                .ok_or_else(|| decode_error("Failed to create Luma buffer".to_string()))?;
            DynamicImage::ImageLuma8(buffer)
        }
        _ => return decode_fallback(name, bytes),
    };

    Ok(image)
}

/// Fallback to image crate for non-JPEG formats
fn decode_fallback(name: &str, bytes: &[u8]) -> Result<DynamicImage, OptimizeError> {
    image::load_from_memory(bytes).map_err(|e| OptimizeError::Decode {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
