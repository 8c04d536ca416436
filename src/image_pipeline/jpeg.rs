//! JPEG writing module
//!
//! This module provides in-memory JPEG encoding behind the [`JpegWriter`] seam.

mod writer;
mod standard_jpeg_writer;
pub mod types;

pub use writer::JpegWriter;
pub use standard_jpeg_writer::StandardJpegWriter;
pub use types::EncodeOptions;
