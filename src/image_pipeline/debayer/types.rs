//! Types for debayering operations

/// 8-bit interleaved RGB image, the unit every later stage works on.
pub type PixelBuffer = image::RgbImage;

/// Standard XYZ to linear sRGB matrix, D65 illuminant.
pub(crate) const XYZ_TO_SRGB: [[f32; 3]; 3] = [
    [ 3.2404542, -1.5371385, -0.4985314],
    [-0.9692660,  1.8760108,  0.0415560],
    [ 0.0556434, -0.2040259,  1.0572252],
];

pub(crate) const IDENTITY: [[f32; 3]; 3] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];
