//! RAW image data types

/// 2x2 colour filter layouts, named by the colours of the top-left quad in
/// reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfaPattern {
    Rggb,
    Bggr,
    Grbg,
    Gbrg,
}

impl CfaPattern {
    /// Builds the pattern from the colour indices (0 = red, 1 = green, 2 = blue,
    /// 3 = second green) at (0,0), (0,1), (1,0) and (1,1).
    pub fn from_quad(quad: [usize; 4]) -> Option<Self> {
        let norm = quad.map(|c| if c == 3 { 1 } else { c });
        match norm {
            [0, 1, 1, 2] => Some(CfaPattern::Rggb),
            [2, 1, 1, 0] => Some(CfaPattern::Bggr),
            [1, 0, 2, 1] => Some(CfaPattern::Grbg),
            [1, 2, 0, 1] => Some(CfaPattern::Gbrg),
            _ => None,
        }
    }
}

/// Represents decoded RAW image data
#[derive(Debug, Clone)]
pub struct RawImageData {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Components per pixel: 1 for Bayer mosaics, 3 for already interpolated RGB
    pub cpp: usize,
    /// Pixel data, `width * height * cpp` samples
    pub data: Vec<u16>,
    /// Actual bits per sample from the sensor (e.g., 12, 14, or 16)
    pub bits_per_sample: u32,
    /// Mosaic layout, `None` when `cpp == 3`
    pub cfa: Option<CfaPattern>,
    /// Black level per colour (R, G, B, G2)
    pub blacklevels: [u16; 4],
    /// White level per colour (R, G, B, G2)
    pub whitelevels: [u16; 4],
    /// As-shot white balance multipliers (R, G, B, G2)
    pub wb_coeffs: [f32; 4],
    /// Camera to XYZ matrix with rows normalized to 1; all zeros when unknown
    pub cam_to_xyz: [[f32; 4]; 3],
    /// Default crop as (top, right, bottom, left) margins
    pub crops: [usize; 4],
    /// EXIF orientation value (1-8)
    pub orientation: u16,
}

impl RawImageData {
    /// A flat-field mosaic with neutral metadata, used as a starting point
    /// by tests and benches.
    pub fn uniform(width: usize, height: usize, value: u16) -> Self {
        Self {
            width,
            height,
            cpp: 1,
            data: vec![value; width * height],
            bits_per_sample: 16,
            cfa: Some(CfaPattern::Rggb),
            blacklevels: [0; 4],
            whitelevels: [u16::MAX; 4],
            wb_coeffs: [1.0; 4],
            cam_to_xyz: [[0.0; 4]; 3],
            crops: [0; 4],
            orientation: 1,
        }
    }
}
