//! Debayering module: renders decoded RAW data into an 8-bit sRGB pixel buffer

pub mod cpu_debayer;
pub mod types;

pub use cpu_debayer::CpuDebayer;
pub use types::PixelBuffer;
