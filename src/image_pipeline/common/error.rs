use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode RAW image: {0}")]
    DecodeError(String),

    #[error("Failed to encode JPEG image: {0}")]
    EncodeError(#[from] JpegEncodeError),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid fit parameters: {0}")]
    InvalidParameters(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failures reported by a [`JpegWriter`](crate::image_pipeline::JpegWriter).
///
/// Only [`JpegEncodeError::OptimizeUnsupported`] is recoverable: the caller may
/// retry the same quality with optimization disabled. Every other variant is
/// fatal for the conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JpegEncodeError {
    #[error("optimized Huffman coding is not available for a {width}x{height} image")]
    OptimizeUnsupported { width: u32, height: u32 },

    #[error("image dimensions {width}x{height} exceed the JPEG limit of {max}")]
    DimensionsTooLarge { width: u32, height: u32, max: u32 },

    #[error("image dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("JPEG encoder failed: {0}")]
    Encoder(String),
}

impl JpegEncodeError {
    pub fn is_option_rejection(&self) -> bool {
        matches!(self, JpegEncodeError::OptimizeUnsupported { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
