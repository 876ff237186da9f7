//! Output encoders.
//!
//! Both encoders take raw RGBA pixels (4 bytes per pixel) so they carry no
//! metadata from the source file into the output.

use super::OutputFormat;
use crate::error::OptimizeError;
use rgb::FromSlice;

/// Trait for output encoders
///
/// The trait is object-safe so the pipeline can hold any implementation.
pub trait ImageEncoder: Send + Sync {
    /// The output format this encoder produces
    fn format(&self) -> OutputFormat;

    /// Encode RGBA pixels at a quality of 1-100
    fn encode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, OptimizeError>;
}

/// Lossy WebP encoder backed by libwebp
#[derive(Debug, Clone, Default)]
pub struct WebpEncoder;

impl ImageEncoder for WebpEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Webp
    }

    fn encode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, OptimizeError> {
        check_rgba_len(OutputFormat::Webp, pixels, width, height)?;

        // libwebp's quality factor is a 0-100 float
        let encoded = webp::Encoder::from_rgba(pixels, width, height)
            .encode_simple(false, quality as f32)
            .map_err(|e| OptimizeError::Encode {
                format: OutputFormat::Webp,
                reason: format!("{:?}", e),
            })?;

        Ok(encoded.to_vec())
    }
}

/// AVIF encoder backed by ravif (rav1e)
#[derive(Debug, Clone)]
pub struct AvifEncoder {
    /// Speed preset (1-10, where 1 is slowest/best compression)
    pub speed: u8,
}

impl Default for AvifEncoder {
    fn default() -> Self {
        Self { speed: 6 }
    }
}

impl ImageEncoder for AvifEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Avif
    }

    fn encode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, OptimizeError> {
        check_rgba_len(OutputFormat::Avif, pixels, width, height)?;

        let image = imgref::Img::new(pixels.as_rgba(), width as usize, height as usize);
        let encoded = ravif::Encoder::new()
            .with_quality(quality as f32)
            .with_alpha_quality(quality as f32)
            .with_speed(self.speed)
            .encode_rgba(image)
            .map_err(|e| OptimizeError::Encode {
                format: OutputFormat::Avif,
                reason: e.to_string(),
            })?;

        Ok(encoded.avif_file)
    }
}

fn check_rgba_len(
    format: OutputFormat,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<(), OptimizeError> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(OptimizeError::Encode {
            format,
            reason: format!("expected {} bytes of RGBA, got {}", expected, pixels.len()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> Vec<u8> {
        (0..width * height)
            .flat_map(|i| {
                let on = (i % width + i / width) % 2 == 0;
                if on {
                    [250, 240, 230, 255]
                } else {
                    [20, 40, 60, 255]
                }
            })
            .collect()
    }

    #[test]
    fn webp_encoder_produces_riff_container() {
        let encoder = WebpEncoder;
        let data = encoder.encode(&checkerboard(8, 8), 8, 8, 80).unwrap();

        assert_eq!(encoder.format(), OutputFormat::Webp);
        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(&data[8..12], b"WEBP");
    }

    #[test]
    fn webp_quality_changes_output() {
        let pixels = checkerboard(32, 32);
        let low = WebpEncoder.encode(&pixels, 32, 32, 5).unwrap();
        let high = WebpEncoder.encode(&pixels, 32, 32, 100).unwrap();
        assert_ne!(low, high);
    }

    #[test]
    fn avif_encoder_produces_ftyp_box() {
        let encoder = AvifEncoder { speed: 10 };
        let data = encoder.encode(&checkerboard(8, 8), 8, 8, 60).unwrap();

        assert_eq!(encoder.format(), OutputFormat::Avif);
        assert_eq!(&data[4..8], b"ftyp");
        assert_eq!(&data[8..12], b"avif");
    }

    #[test]
    fn webp_rejects_mismatched_buffer() {
        let result = WebpEncoder.encode(&[0; 12], 2, 2, 50);
        assert!(matches!(result, Err(OptimizeError::Encode { .. })));
    }

    #[test]
    fn avif_rejects_mismatched_buffer() {
        let result = AvifEncoder::default().encode(&[0, 0, 0], 1, 1, 50);
        assert!(matches!(result, Err(OptimizeError::Encode { .. })));
    }
}
