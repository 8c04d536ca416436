use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use image::imageops;
use tracing::{debug, info};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::debayer::types::{IDENTITY, PixelBuffer, XYZ_TO_SRGB};
use crate::image_pipeline::raw::types::{CfaPattern, RawImageData};

/// Entries in the linear-to-sRGB lookup table (one per 16-bit linear level).
const GAMMA_LUT_SIZE: usize = 1 << 16;

/// Renders RAW sensor data into a viewable 8-bit sRGB image on the CPU.
///
/// Stages: linear demosaic, black/white level normalisation, as-shot white
/// balance, camera to sRGB matrix, sRGB transfer curve, default crop and
/// EXIF orientation.
pub struct CpuDebayer {
    gamma_lut: Vec<u8>,
}

impl Default for CpuDebayer {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuDebayer {
    pub fn new() -> Self {
        let max = (GAMMA_LUT_SIZE - 1) as f32;
        let gamma_lut = (0..GAMMA_LUT_SIZE)
            .map(|i| (srgb_encode(i as f32 / max) * 255.0).round() as u8)
            .collect();
        Self { gamma_lut }
    }

    pub fn process(&self, raw_image: &RawImageData) -> Result<PixelBuffer> {
        let width = raw_image.width;
        let height = raw_image.height;
        info!("Starting CPU debayering for image {}x{}", width, height);

        let expected = width * height * raw_image.cpp;
        if raw_image.data.len() != expected {
            return Err(ConversionError::DecodeError(format!(
                "expected {} samples for {}x{}x{}, got {}",
                expected,
                width,
                height,
                raw_image.cpp,
                raw_image.data.len()
            )));
        }

        let rgb16 = match (raw_image.cpp, raw_image.cfa) {
            (1, Some(cfa)) => demosaic(raw_image, cfa)?,
            (3, _) => raw_image.data.clone(),
            (cpp, _) => {
                return Err(ConversionError::UnsupportedFormat(format!(
                    "{} components per pixel without a Bayer layout",
                    cpp
                )));
            }
        };

        let rgb8 = self.render(raw_image, &rgb16);
        let image = PixelBuffer::from_raw(width as u32, height as u32, rgb8)
            .ok_or(ConversionError::InvalidDimensions(width, height))?;

        let image = apply_crop(image, raw_image.crops);
        let image = apply_orientation(image, raw_image.orientation);

        debug!(
            width = image.width(),
            height = image.height(),
            "Debayering complete"
        );
        Ok(image)
    }

    /// Levels, white balance, colour matrix and gamma, from 16-bit camera RGB
    /// to 8-bit sRGB.
    fn render(&self, raw_image: &RawImageData, rgb16: &[u16]) -> Vec<u8> {
        let black: [f32; 3] = std::array::from_fn(|c| raw_image.blacklevels[c] as f32);
        let range: [f32; 3] = std::array::from_fn(|c| {
            (raw_image.whitelevels[c] as f32 - black[c]).max(1.0)
        });
        let wb = white_balance(raw_image.wb_coeffs);
        let matrix = cam_to_srgb(&raw_image.cam_to_xyz);
        let lut_max = (GAMMA_LUT_SIZE - 1) as f32;

        rgb16
            .chunks_exact(3)
            .flat_map(|px| {
                let lin: [f32; 3] = std::array::from_fn(|c| {
                    (((px[c] as f32 - black[c]).max(0.0) / range[c]) * wb[c]).min(1.0)
                });
                std::array::from_fn::<u8, 3, _>(|r| {
                    let v = matrix[r][0] * lin[0] + matrix[r][1] * lin[1] + matrix[r][2] * lin[2];
                    self.gamma_lut[(v.clamp(0.0, 1.0) * lut_max).round() as usize]
                })
            })
            .collect()
    }
}

fn demosaic(raw_image: &RawImageData, cfa: CfaPattern) -> Result<Vec<u16>> {
    let width = raw_image.width;
    let height = raw_image.height;

    let bayer_bytes: Vec<u8> = raw_image.data.iter().flat_map(|&v| v.to_le_bytes()).collect();
    let mut output_buf = vec![0u8; width * height * 3 * 2];
    let mut cursor = Cursor::new(&bayer_bytes[..]);

    debug!("Running demosaic with CFA={:?}, algo=Linear", cfa);
    let cfa = match cfa {
        CfaPattern::Rggb => CFA::RGGB,
        CfaPattern::Bggr => CFA::BGGR,
        CfaPattern::Grbg => CFA::GRBG,
        CfaPattern::Gbrg => CFA::GBRG,
    };

    {
        let mut output_raster = RasterMut::new(width, height, RasterDepth::Depth16, &mut output_buf);
        bayer::run_demosaic(
            &mut cursor,
            BayerDepth::Depth16LE,
            cfa,
            Demosaic::Linear,
            &mut output_raster,
        )
        .map_err(|e| ConversionError::DecodeError(format!("Demosaic failed: {:?}", e)))?;
    }

    Ok(output_buf
        .chunks_exact(2)
        .map(|b| u16::from_ne_bytes([b[0], b[1]]))
        .collect())
}

/// Multipliers relative to green; unknown or invalid coefficients count as 1.
fn white_balance(coeffs: [f32; 4]) -> [f32; 3] {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if !valid(coeffs[1]) {
        return [1.0; 3];
    }
    std::array::from_fn(|c| if valid(coeffs[c]) { coeffs[c] / coeffs[1] } else { 1.0 })
}

/// Camera RGB to linear sRGB, rows normalized so a white-balanced neutral
/// stays neutral. Falls back to identity for cameras without a matrix.
fn cam_to_srgb(cam_to_xyz: &[[f32; 4]; 3]) -> [[f32; 3]; 3] {
    let mut out = [[0.0f32; 3]; 3];
    for r in 0..3 {
        for c in 0..3 {
            out[r][c] = (0..3).map(|k| XYZ_TO_SRGB[r][k] * cam_to_xyz[k][c]).sum();
        }
    }

    for row in out.iter_mut() {
        let sum: f32 = row.iter().sum();
        if !sum.is_finite() || sum.abs() < f32::EPSILON {
            return IDENTITY;
        }
        row.iter_mut().for_each(|v| *v /= sum);
    }
    out
}

fn srgb_encode(linear: f32) -> f32 {
    if linear <= 0.003_130_8 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// Crop margins are (top, right, bottom, left); margins that would leave no
/// image are ignored.
fn apply_crop(image: PixelBuffer, crops: [usize; 4]) -> PixelBuffer {
    let [top, right, bottom, left] = crops.map(|v| v as u32);
    if top == 0 && right == 0 && bottom == 0 && left == 0 {
        return image;
    }
    let (w, h) = image.dimensions();
    if left.saturating_add(right) >= w || top.saturating_add(bottom) >= h {
        debug!("Ignoring crop {:?} for {}x{} image", crops, w, h);
        return image;
    }
    imageops::crop_imm(&image, left, top, w - left - right, h - top - bottom).to_image()
}

fn apply_orientation(image: PixelBuffer, orientation: u16) -> PixelBuffer {
    match orientation {
        2 => imageops::flip_horizontal(&image),
        3 => imageops::rotate180(&image),
        4 => imageops::flip_vertical(&image),
        5 => imageops::flip_horizontal(&imageops::rotate90(&image)),
        6 => imageops::rotate90(&image),
        7 => imageops::flip_horizontal(&imageops::rotate270(&image)),
        8 => imageops::rotate270(&image),
        _ => image,
    }
}
