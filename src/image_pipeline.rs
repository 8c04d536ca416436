//! Image processing pipeline module
//!
//! RAW reading, demosaicing, JPEG encoding and the size-fitting search live in
//! separate modules; `conversions` wires them into the RAW to JPEG pipeline.

pub mod raw;
pub mod debayer;
pub mod jpeg;
pub mod fit;
pub mod conversions;
pub mod common;

pub use common::{
    ConversionError,
    JpegEncodeError,
    Result,
};

pub use raw::{
    CfaPattern,
    RawImageData,
    RawImageReader,
    RawLoaderReader,
};

pub use debayer::{
    CpuDebayer,
    PixelBuffer,
};

pub use jpeg::{
    EncodeOptions,
    JpegWriter,
    StandardJpegWriter,
};

pub use fit::{
    fit_to_budget,
    megabytes_to_bytes,
    EncodeAttempt,
    FitParameters,
    FitParametersBuilder,
    FitResult,
    FitStage,
    BYTES_PER_MB,
};

pub use conversions::{
    ConversionConfig,
    ConversionConfigBuilder,
    RawToJpegPipeline,
};
