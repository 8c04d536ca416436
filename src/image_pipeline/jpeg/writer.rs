use crate::image_pipeline::common::error::JpegEncodeError;
use crate::image_pipeline::debayer::types::PixelBuffer;
use crate::image_pipeline::jpeg::types::EncodeOptions;

pub trait JpegWriter {
    /// Encodes `image` at `quality` (1-100) and returns the complete JPEG stream.
    fn encode_jpeg(
        &self,
        image: &PixelBuffer,
        quality: u8,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, JpegEncodeError>;
}
