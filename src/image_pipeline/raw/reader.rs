use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::types::RawImageData;

/// Source of decoded sensor data for the conversion pipeline.
///
/// Implementations return `ConversionError::DecodeError` for unreadable input
/// and `ConversionError::UnsupportedFormat` for sensors the debayer stage
/// cannot render; both abort the conversion before anything is written.
pub trait RawImageReader {
    fn read_raw(&self, data: &[u8]) -> Result<RawImageData>;
}
