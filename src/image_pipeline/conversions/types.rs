//! RAW to JPEG conversion configuration types

use crate::image_pipeline::fit::types::FitParameters;

/// Configuration for RAW to JPEG conversion
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Budget and search space for the size-fitting encoder
    pub fit: FitParameters,
    /// Whether to reject decoded images with a zero dimension before rendering
    pub validate_dimensions: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            fit: FitParameters::default(),
            validate_dimensions: true,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    fit: Option<FitParameters>,
    validate_dimensions: Option<bool>,
}

impl ConversionConfigBuilder {
    pub fn fit(mut self, fit: FitParameters) -> Self {
        self.fit = Some(fit);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            fit: self.fit.unwrap_or(default.fit),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
        }
    }
}
