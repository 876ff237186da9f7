//! EXIF orientation detection and correction.

use crate::error::OptimizeError;
use super::SurfaceRole;
use exif::{In, Reader, Tag};
use image::{imageops, GenericImage, ImageResult, Rgba, RgbaImage};
use std::io::Cursor;

/// How a decoded bitmap must be transformed to display upright.
///
/// Built from the EXIF orientation tag; anything other than 2-8
/// (including a missing tag) maps to [`Orientation::Identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// 1, absent or unrecognized
    Identity,
    /// 2
    MirrorHorizontal,
    /// 3
    Rotate180,
    /// 4
    MirrorVertical,
    /// 5: mirror across the main diagonal
    Transpose,
    /// 6: rotate 90° clockwise
    Rotate90,
    /// 7: mirror across the anti-diagonal
    Transverse,
    /// 8: rotate 270° clockwise
    Rotate270,
}

impl Orientation {
    /// Map an EXIF orientation value to a transform
    pub fn from_exif(value: Option<u16>) -> Self {
        match value {
            Some(2) => Self::MirrorHorizontal,
            Some(3) => Self::Rotate180,
            Some(4) => Self::MirrorVertical,
            Some(5) => Self::Transpose,
            Some(6) => Self::Rotate90,
            Some(7) => Self::Transverse,
            Some(8) => Self::Rotate270,
            _ => Self::Identity,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Draw `bitmap` into a surface of the same size, applying this transform.
    ///
    /// Quarter turns behave like an affine draw onto a canvas: the turned
    /// bitmap is anchored at the origin and clipped to the surface, and any
    /// area it does not cover stays transparent.
    pub fn draw(&self, bitmap: &RgbaImage, surface: &mut RgbaImage) -> Result<(), OptimizeError> {
        if surface.dimensions() != bitmap.dimensions() {
            return Err(surface_error(
                surface,
                format!(
                    "surface is {}x{}, bitmap is {}x{}",
                    surface.width(),
                    surface.height(),
                    bitmap.width(),
                    bitmap.height()
                ),
            ));
        }

        let drawn = match self {
            Self::Identity => surface.copy_from(bitmap, 0, 0),
            Self::MirrorHorizontal => imageops::flip_horizontal_in(bitmap, surface),
            Self::Rotate180 => imageops::rotate180_in(bitmap, surface),
            Self::MirrorVertical => imageops::flip_vertical_in(bitmap, surface),
            Self::Transpose => {
                let mut turned = imageops::rotate90(bitmap);
                imageops::flip_horizontal_in_place(&mut turned);
                draw_clipped(&turned, surface)
            }
            Self::Rotate90 => draw_clipped(&imageops::rotate90(bitmap), surface),
            Self::Transverse => {
                let mut turned = imageops::rotate270(bitmap);
                imageops::flip_horizontal_in_place(&mut turned);
                draw_clipped(&turned, surface)
            }
            Self::Rotate270 => draw_clipped(&imageops::rotate270(bitmap), surface),
        };

        drawn.map_err(|e| surface_error(surface, e.to_string()))
    }
}

fn surface_error(surface: &RgbaImage, reason: String) -> OptimizeError {
    OptimizeError::Surface {
        role: SurfaceRole::Source,
        width: surface.width(),
        height: surface.height(),
        reason,
    }
}

fn draw_clipped(turned: &RgbaImage, surface: &mut RgbaImage) -> ImageResult<()> {
    let width = turned.width().min(surface.width());
    let height = turned.height().min(surface.height());
    for pixel in surface.pixels_mut() {
        *pixel = Rgba([0, 0, 0, 0]);
    }
    let visible = imageops::crop_imm(turned, 0, 0, width, height).to_image();
    surface.copy_from(&visible, 0, 0)
}

/// Read the EXIF orientation tag from raw file bytes.
///
/// Returns `None` when there is no EXIF block, it cannot be parsed,
/// or the value is outside 1-8.
pub fn read_exif_orientation(bytes: &[u8]) -> Option<u16> {
    let mut cursor = Cursor::new(bytes);
    let exif = match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(e) => {
            tracing::trace!("no readable EXIF: {}", e);
            return None;
        }
    };

    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    let value = field.value.get_uint(0)?;

    match u16::try_from(value) {
        Ok(orientation @ 1..=8) => Some(orientation),
        _ => {
            tracing::debug!(value, "ignoring out-of-range EXIF orientation");
            None
        }
    }
}
