//! RAW image reader implementation using the rawloader library.
//!
//! This module supports every RAW format rawloader can decode (ARW, CR2, NEF,
//! DNG, ...). It decodes the sensor data and extracts the metadata the
//! debayer stage needs to render a viewable image: levels, white balance,
//! colour matrix, default crop and orientation.

use std::io::Cursor;

use tracing::debug;
use rawloader::RawImageData as RawloaderImageData;
use crate::image_pipeline::common::error::{Result, ConversionError};
use crate::image_pipeline::raw::types::{CfaPattern, RawImageData};
use crate::image_pipeline::raw::reader::RawImageReader;

/// RAW image reader that uses the rawloader library for decoding.
pub struct RawLoaderReader;

/// Default bit depth when no white level information is available from the RAW file.
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

/// The bit width of the u16 data type, used for calculating actual bits per sample.
const U16_BITS: u32 = 16;

/// Side of the window checked to tell a 2x2 Bayer layout from larger ones (X-Trans is 6x6).
const CFA_PROBE: usize = 6;

fn bayer_pattern(cfa: &rawloader::CFA) -> Option<CfaPattern> {
    for row in 0..CFA_PROBE {
        for col in 0..CFA_PROBE {
            if cfa.color_at(row, col) != cfa.color_at(row % 2, col % 2) {
                return None;
            }
        }
    }
    CfaPattern::from_quad([
        cfa.color_at(0, 0),
        cfa.color_at(0, 1),
        cfa.color_at(1, 0),
        cfa.color_at(1, 1),
    ])
}

impl RawImageReader for RawLoaderReader {
    /// Decodes a RAW file held in memory.
    ///
    /// Integer samples are kept as-is, float samples (normalized 0.0-1.0) are
    /// scaled to the u16 range. The sensor bit depth is derived from the
    /// largest white level.
    ///
    /// # Errors
    ///
    /// * `ConversionError::DecodeError` - rawloader could not parse the data
    /// * `ConversionError::UnsupportedFormat` - the sensor layout is neither a
    ///   2x2 Bayer mosaic nor 3-component RGB
    fn read_raw(&self, data: &[u8]) -> Result<RawImageData> {
        debug!("Decoding RAW image, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| ConversionError::DecodeError(e.to_string()))?;

        let width = decoded.width;
        let height = decoded.height;
        let cpp = decoded.cpp;

        debug!(
            make = %decoded.make,
            model = %decoded.model,
            cpp,
            "Decoded image: {}x{}", width, height
        );

        let cfa = match cpp {
            1 => Some(bayer_pattern(&decoded.cfa).ok_or_else(|| {
                ConversionError::UnsupportedFormat("non-Bayer colour filter array".to_string())
            })?),
            3 => None,
            other => {
                return Err(ConversionError::UnsupportedFormat(format!(
                    "{} components per pixel",
                    other
                )));
            }
        };

        let samples: Vec<u16> = match &decoded.data {
            RawloaderImageData::Integer(values) => values.clone(),
            RawloaderImageData::Float(values) => {
                values.iter().map(|&v| (v * u16::MAX as f32) as u16).collect()
            }
        };

        // The white level is the largest value the sensor can produce, so its
        // bit length is the sensor depth (4095 -> 12 bits, 16383 -> 14 bits).
        let max_white_level = decoded.whitelevels.iter().max().copied().unwrap_or(u16::MAX);
        let bits_per_sample = if max_white_level == 0 {
            DEFAULT_BITS_PER_SAMPLE
        } else {
            U16_BITS - max_white_level.leading_zeros()
        };

        debug!("Calculated bits_per_sample: {} (max white level: {})", bits_per_sample, max_white_level);

        Ok(RawImageData {
            width,
            height,
            cpp,
            data: samples,
            bits_per_sample,
            cfa,
            blacklevels: decoded.blacklevels,
            whitelevels: decoded.whitelevels,
            wb_coeffs: decoded.wb_coeffs,
            cam_to_xyz: decoded.cam_to_xyz_normalized(),
            crops: decoded.crops,
            orientation: decoded.orientation.to_u16(),
        })
    }
}
