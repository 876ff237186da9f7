//! Pixel surfaces used by the pipeline.
//!
//! Every intermediate bitmap is acquired through a [`SurfaceAllocator`],
//! which is the pipeline's only fatal failure point besides decoding.

use crate::error::OptimizeError;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// What a surface is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceRole {
    /// Upright copy of the decoded bitmap
    Source,
    /// Scaled output bitmap
    Destination,
    /// Pixel readback of the destination for the AVIF encoder
    Readback,
}

impl std::fmt::Display for SurfaceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceRole::Source => write!(f, "source"),
            SurfaceRole::Destination => write!(f, "destination"),
            SurfaceRole::Readback => write!(f, "readback"),
        }
    }
}

/// Hands out RGBA surfaces.
///
/// Implement this to bound memory differently or to simulate failures in tests.
pub trait SurfaceAllocator: Send + Sync {
    /// Acquire a zeroed RGBA surface of the given size
    fn acquire(&self, role: SurfaceRole, width: u32, height: u32)
        -> Result<RgbaImage, OptimizeError>;
}

/// Allocator that refuses empty surfaces and surfaces above a pixel budget
#[derive(Debug, Clone)]
pub struct PixelBudgetAllocator {
    max_pixels: u64,
}

impl PixelBudgetAllocator {
    /// Default budget: 100 megapixels per surface
    pub const DEFAULT_MAX_PIXELS: u64 = 100_000_000;

    pub fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }

    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }
}

impl Default for PixelBudgetAllocator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_PIXELS)
    }
}

impl SurfaceAllocator for PixelBudgetAllocator {
    fn acquire(
        &self,
        role: SurfaceRole,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, OptimizeError> {
        let fail = |reason: String| OptimizeError::Surface {
            role,
            width,
            height,
            reason,
        };

        if width == 0 || height == 0 {
            return Err(fail("surface has no pixels".to_string()));
        }

        let pixels = width as u64 * height as u64;
        if pixels > self.max_pixels {
            return Err(fail(format!(
                "{} pixels exceeds the budget of {}",
                pixels, self.max_pixels
            )));
        }

        Ok(RgbaImage::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquires_surface_of_requested_size() {
        let allocator = PixelBudgetAllocator::default();
        let surface = allocator.acquire(SurfaceRole::Source, 12, 7).unwrap();
        assert_eq!(surface.dimensions(), (12, 7));
    }

    #[test]
    fn rejects_empty_surface() {
        let allocator = PixelBudgetAllocator::default();
        let result = allocator.acquire(SurfaceRole::Destination, 0, 10);
        assert!(matches!(
            result,
            Err(OptimizeError::Surface {
                role: SurfaceRole::Destination,
                ..
            })
        ));
    }

    #[test]
    fn rejects_surface_over_budget() {
        let allocator = PixelBudgetAllocator::new(100);
        assert!(allocator.acquire(SurfaceRole::Source, 10, 10).is_ok());
        assert!(allocator.acquire(SurfaceRole::Source, 11, 10).is_err());
    }
}
