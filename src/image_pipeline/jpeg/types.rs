//! JPEG encoder option types

/// Extra encoder settings passed through the size-fitting search unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Build per-image Huffman tables (smaller output, needs the whole image buffered)
    pub optimize: bool,
    /// Write a progressive instead of a baseline JPEG
    pub progressive: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            progressive: false,
        }
    }
}

impl EncodeOptions {
    pub fn without_optimize(self) -> Self {
        Self {
            optimize: false,
            ..self
        }
    }
}
