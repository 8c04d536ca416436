use jpeg_encoder::{ColorType, Encoder};
use tracing::trace;

use crate::image_pipeline::common::error::JpegEncodeError;
use crate::image_pipeline::debayer::types::PixelBuffer;
use crate::image_pipeline::jpeg::types::EncodeOptions;
use crate::image_pipeline::jpeg::writer::JpegWriter;

/// Largest width or height a baseline JPEG header can describe.
pub const MAX_JPEG_DIMENSION: u32 = u16::MAX as u32;

/// Optimized Huffman tables need every coefficient block held in memory
/// before the first byte is written; above this pixel count the writer
/// refuses the option instead.
pub const DEFAULT_OPTIMIZE_PIXEL_LIMIT: u64 = 64_000_000;

/// JPEG writer backed by the pure-Rust `jpeg-encoder` crate.
#[derive(Debug, Clone)]
pub struct StandardJpegWriter {
    optimize_pixel_limit: u64,
}

impl Default for StandardJpegWriter {
    fn default() -> Self {
        Self {
            optimize_pixel_limit: DEFAULT_OPTIMIZE_PIXEL_LIMIT,
        }
    }
}

impl StandardJpegWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_optimize_pixel_limit(mut self, limit: u64) -> Self {
        self.optimize_pixel_limit = limit;
        self
    }

    pub fn optimize_pixel_limit(&self) -> u64 {
        self.optimize_pixel_limit
    }
}

impl JpegWriter for StandardJpegWriter {
    fn encode_jpeg(
        &self,
        image: &PixelBuffer,
        quality: u8,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, JpegEncodeError> {
        let (width, height) = image.dimensions();
        trace!(width, height, quality, ?options, "Encoding JPEG");

        if width == 0 || height == 0 {
            return Err(JpegEncodeError::ZeroDimensions { width, height });
        }
        if width > MAX_JPEG_DIMENSION || height > MAX_JPEG_DIMENSION {
            return Err(JpegEncodeError::DimensionsTooLarge {
                width,
                height,
                max: MAX_JPEG_DIMENSION,
            });
        }
        if options.optimize && u64::from(width) * u64::from(height) > self.optimize_pixel_limit {
            return Err(JpegEncodeError::OptimizeUnsupported { width, height });
        }

        let mut buffer = Vec::new();
        let mut encoder = Encoder::new(&mut buffer, quality.clamp(1, 100));
        encoder.set_optimized_huffman_tables(options.optimize);
        encoder.set_progressive(options.progressive);

        encoder
            .encode(image.as_raw(), width as u16, height as u16, ColorType::Rgb)
            .map_err(|e| JpegEncodeError::Encoder(e.to_string()))?;

        Ok(buffer)
    }
}
