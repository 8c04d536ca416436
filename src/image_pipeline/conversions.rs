//! Pipeline conversions module
//!
//! This module contains orchestration logic for the RAW to JPEG conversion.

mod raw_to_jpeg;
pub mod types;


pub use raw_to_jpeg::RawToJpegPipeline;
pub use types::{ConversionConfig, ConversionConfigBuilder};
