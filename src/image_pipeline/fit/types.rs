//! Size-fitting configuration and outcome types

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::jpeg::types::EncodeOptions;

/// Bytes per megabyte used for every budget conversion.
pub const BYTES_PER_MB: u64 = 1_048_576;

/// Converts a size in megabytes to bytes, truncating toward zero.
pub fn megabytes_to_bytes(megabytes: f64) -> u64 {
    (megabytes * BYTES_PER_MB as f64) as u64
}

/// Search configuration for one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct FitParameters {
    /// Largest acceptable output size in bytes
    pub max_bytes: u64,
    /// Quality every descent starts from (1-100)
    pub initial_quality: u8,
    /// Lowest quality tried, also used by the fallback encode
    pub min_quality: u8,
    /// Quality decrement between attempts
    pub quality_step: u8,
    /// Scale applied to both dimensions on every downscale, in (0, 1)
    pub resize_factor: f64,
    /// No downscale may go below this width
    pub min_width: u32,
    /// No downscale may go below this height
    pub min_height: u32,
    pub encode_options: EncodeOptions,
}

impl Default for FitParameters {
    fn default() -> Self {
        Self {
            max_bytes: megabytes_to_bytes(5.0),
            initial_quality: 95,
            min_quality: 25,
            quality_step: 5,
            resize_factor: 0.9,
            min_width: 400,
            min_height: 300,
            encode_options: EncodeOptions::default(),
        }
    }
}

impl FitParameters {
    pub fn builder() -> FitParametersBuilder {
        FitParametersBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ConversionError::InvalidParameters(msg));

        if self.max_bytes == 0 {
            return invalid("byte budget must be greater than zero".to_string());
        }
        if !(1..=100).contains(&self.initial_quality) {
            return invalid(format!("initial quality {} is outside 1-100", self.initial_quality));
        }
        if !(1..=100).contains(&self.min_quality) {
            return invalid(format!("minimum quality {} is outside 1-100", self.min_quality));
        }
        if self.min_quality > self.initial_quality {
            return invalid(format!(
                "minimum quality {} exceeds initial quality {}",
                self.min_quality, self.initial_quality
            ));
        }
        if self.quality_step == 0 {
            return invalid("quality step must be greater than zero".to_string());
        }
        if !(self.resize_factor > 0.0 && self.resize_factor < 1.0) {
            return invalid(format!("resize factor {} is outside (0, 1)", self.resize_factor));
        }
        if self.min_width == 0 || self.min_height == 0 {
            return invalid(format!(
                "minimum dimensions {}x{} must be at least 1x1",
                self.min_width, self.min_height
            ));
        }
        Ok(())
    }

    /// Qualities of one descent, highest first.
    pub fn quality_ladder(&self) -> impl Iterator<Item = u8> {
        let step = usize::from(self.quality_step.max(1));
        (self.min_quality..=self.initial_quality).rev().step_by(step)
    }
}

/// Builder for FitParameters
#[derive(Default)]
pub struct FitParametersBuilder {
    max_bytes: Option<u64>,
    initial_quality: Option<u8>,
    min_quality: Option<u8>,
    quality_step: Option<u8>,
    resize_factor: Option<f64>,
    min_width: Option<u32>,
    min_height: Option<u32>,
    encode_options: Option<EncodeOptions>,
}

impl FitParametersBuilder {
    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = Some(bytes);
        self
    }

    pub fn max_output_mb(mut self, megabytes: f64) -> Self {
        self.max_bytes = Some(megabytes_to_bytes(megabytes));
        self
    }

    pub fn initial_quality(mut self, quality: u8) -> Self {
        self.initial_quality = Some(quality);
        self
    }

    pub fn min_quality(mut self, quality: u8) -> Self {
        self.min_quality = Some(quality);
        self
    }

    pub fn quality_step(mut self, step: u8) -> Self {
        self.quality_step = Some(step);
        self
    }

    pub fn resize_factor(mut self, factor: f64) -> Self {
        self.resize_factor = Some(factor);
        self
    }

    pub fn min_dimensions(mut self, width: u32, height: u32) -> Self {
        self.min_width = Some(width);
        self.min_height = Some(height);
        self
    }

    pub fn encode_options(mut self, options: EncodeOptions) -> Self {
        self.encode_options = Some(options);
        self
    }

    pub fn build(self) -> FitParameters {
        let default = FitParameters::default();
        FitParameters {
            max_bytes: self.max_bytes.unwrap_or(default.max_bytes),
            initial_quality: self.initial_quality.unwrap_or(default.initial_quality),
            min_quality: self.min_quality.unwrap_or(default.min_quality),
            quality_step: self.quality_step.unwrap_or(default.quality_step),
            resize_factor: self.resize_factor.unwrap_or(default.resize_factor),
            min_width: self.min_width.unwrap_or(default.min_width),
            min_height: self.min_height.unwrap_or(default.min_height),
            encode_options: self.encode_options.unwrap_or(default.encode_options),
        }
    }
}

/// One encode-and-measure step of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeAttempt {
    pub quality: u8,
    pub width: u32,
    pub height: u32,
    pub size: usize,
}

/// Where the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStage {
    /// A quality descent produced an encoding within budget
    QualityDescent,
    /// The resolution floor was reached; the result is the minimum-quality encode
    Fallback,
}

#[derive(Debug, Clone)]
pub struct FitResult {
    /// Encoded JPEG stream to be written
    pub jpeg: Vec<u8>,
    pub quality: u8,
    pub width: u32,
    pub height: u32,
    /// Whether `jpeg` fits the byte budget
    pub within_budget: bool,
    pub stage: FitStage,
    /// Every in-loop attempt in order; the fallback encode is not included
    pub attempts: Vec<EncodeAttempt>,
    /// Number of resolution tiers below native that were searched
    pub downscales: usize,
}

impl FitResult {
    pub fn size(&self) -> usize {
        self.jpeg.len()
    }
}
