//! Size-fitting search
//!
//! Finds the highest JPEG quality, at the largest resolution, whose encoded
//! size fits a byte budget. Quality is exhausted at each resolution before the
//! image is shrunk; when the resolution floor is reached the image is encoded
//! once more at the minimum quality as a fallback.

mod resize;
mod size_fitter;
pub mod types;

#[cfg(test)]
mod tests;

pub use resize::{downscale, shrink_dimensions};
pub use size_fitter::fit_to_budget;
pub use types::{
    megabytes_to_bytes, EncodeAttempt, FitParameters, FitParametersBuilder, FitResult, FitStage,
    BYTES_PER_MB,
};
