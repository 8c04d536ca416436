use image::imageops::{self, FilterType};

use crate::image_pipeline::debayer::types::PixelBuffer;

/// Scales both dimensions by `factor`, truncating toward zero.
pub fn shrink_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    (
        (f64::from(width) * factor) as u32,
        (f64::from(height) * factor) as u32,
    )
}

/// Lanczos3 resample into a new buffer; the source is left untouched.
pub fn downscale(image: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    imageops::resize(image, width, height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shrink_truncates() {
        assert_eq!(shrink_dimensions(6000, 4000, 0.9), (5400, 3600));
        assert_eq!(shrink_dimensions(5400, 3600, 0.9), (4860, 3240));
        assert_eq!(shrink_dimensions(485, 323, 0.9), (436, 290));
        assert_eq!(shrink_dimensions(1, 1, 0.9), (0, 0));
    }

    #[test]
    fn test_downscale_dimensions_and_colour() {
        let image = PixelBuffer::from_pixel(100, 80, image::Rgb([200, 100, 50]));
        let small = downscale(&image, 90, 72);

        assert_eq!(small.dimensions(), (90, 72));
        assert_eq!(image.dimensions(), (100, 80));
        assert_eq!(small.get_pixel(45, 36).0, [200, 100, 50]);
    }
}
