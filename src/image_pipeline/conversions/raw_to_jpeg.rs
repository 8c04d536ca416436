use tracing::{error, info, instrument};
use std::io::Write;
use std::path::Path;

use crate::image_pipeline::{
    common::error::{ConversionError, Result},
    conversions::types::ConversionConfig,
    debayer::{CpuDebayer, PixelBuffer},
    fit::{fit_to_budget, FitResult, FitStage, BYTES_PER_MB},
    jpeg::{JpegWriter, StandardJpegWriter},
    raw::{RawImageReader, RawLoaderReader},
};

fn as_mb(bytes: usize) -> f64 {
    bytes as f64 / BYTES_PER_MB as f64
}

pub struct RawToJpegPipeline<R: RawImageReader, W: JpegWriter> {
    reader: R,
    debayer: CpuDebayer,
    writer: W,
    config: ConversionConfig,
}

impl RawToJpegPipeline<RawLoaderReader, StandardJpegWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            reader: RawLoaderReader,
            debayer: CpuDebayer::new(),
            writer: StandardJpegWriter::new(),
            config,
        }
    }
}

impl<R: RawImageReader, W: JpegWriter> RawToJpegPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            debayer: CpuDebayer::new(),
            writer,
            config,
        }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        Ok(())
    }

    /// Decodes RAW bytes into the 8-bit RGB image the size search starts from.
    #[instrument(skip_all, fields(input_size = input_data.len()))]
    pub fn decode(&self, input_data: &[u8]) -> Result<PixelBuffer> {
        let raw_image = {
            let _span = tracing::info_span!("decode_raw").entered();
            self.reader.read_raw(input_data)?
        };

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = raw_image.width,
                height = raw_image.height
            ).entered();
            self.validate_dimensions(raw_image.width, raw_image.height)?;
        }

        let _span = tracing::info_span!("debayer").entered();
        self.debayer.process(&raw_image)
    }

    fn fit(&self, input_data: &[u8], source: &str) -> Result<FitResult> {
        let image = self.decode(input_data)?;
        info!(
            "Input: {} ({:.2} MB), initial resolution {}x{}",
            source,
            as_mb(input_data.len()),
            image.width(),
            image.height()
        );

        let _span = tracing::info_span!("fit_to_budget").entered();
        fit_to_budget(&self.writer, image, &self.config.fit)
    }

    /// Converts RAW bytes and writes the chosen JPEG to `output`.
    ///
    /// Nothing is written unless decoding and the size search both succeed.
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<FitResult> {
        info!("Starting RAW to JPEG conversion");
        let result = self.fit(input_data, "<memory>")?;

        {
            let _span = tracing::info_span!("write_output", size = result.size()).entered();
            output.write_all(&result.jpeg)?;
        }

        info!(
            width = result.width,
            height = result.height,
            quality = result.quality,
            within_budget = result.within_budget,
            "Conversion complete"
        );
        Ok(result)
    }

    /// Converts `input_path` into a JPEG at `output_path`, overwriting it.
    ///
    /// The output file is created only after a result has been chosen, so a
    /// failed decode or encode leaves no file behind.
    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<FitResult> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        let result = self.fit(&input_data, &input_path.display().to_string())?;

        {
            let _span = tracing::info_span!("write_output", size = result.size()).entered();
            std::fs::write(output_path, &result.jpeg).map_err(|e| {
                ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?;
        }

        match result.stage {
            FitStage::QualityDescent => info!(
                "Saved: {} ({:.2} MB, quality={})",
                output_path.display(),
                as_mb(result.size()),
                result.quality
            ),
            FitStage::Fallback => info!(
                "Final saved at min_quality={}: {:.2} MB",
                result.quality,
                as_mb(result.size())
            ),
        }

        Ok(result)
    }

    /// Runs [`convert_file`](Self::convert_file) and reports whether the file on
    /// disk fits the budget. Errors are logged and count as `false`.
    pub fn convert_file_within_budget<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> bool {
        match self.convert_file(input_path, output_path) {
            Ok(result) => result.within_budget,
            Err(e) => {
                error!("Conversion failed: {}", e);
                false
            }
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.config = config;
    }
}
