//! Output size computation.

/// Compute the output size for an image.
///
/// Images no wider than `max_width` keep their size; wider ones are scaled
/// to `max_width` with the height rounded to preserve the aspect ratio.
pub fn target_size(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }

    let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, scaled.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_upscales() {
        assert_eq!(target_size(400, 300, 500), (400, 300));
    }

    #[test]
    fn equal_width_is_unchanged() {
        assert_eq!(target_size(500, 123, 500), (500, 123));
    }

    #[test]
    fn downscales_preserving_aspect() {
        assert_eq!(target_size(1000, 800, 500), (500, 400));
        assert_eq!(target_size(4032, 3024, 1920), (1920, 1440));
    }

    #[test]
    fn rounds_height_to_nearest() {
        // 333 * 100 / 1000 = 33.3
        assert_eq!(target_size(1000, 333, 100), (100, 33));
        // 335 * 100 / 1000 = 33.5
        assert_eq!(target_size(1000, 335, 100), (100, 34));
    }

    #[test]
    fn extreme_panorama_keeps_one_row() {
        assert_eq!(target_size(10_000, 1, 100), (100, 1));
    }
}
