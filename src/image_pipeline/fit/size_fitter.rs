use tracing::{debug, info, instrument, warn};

use crate::image_pipeline::common::error::{JpegEncodeError, Result};
use crate::image_pipeline::debayer::types::PixelBuffer;
use crate::image_pipeline::fit::resize::{downscale, shrink_dimensions};
use crate::image_pipeline::fit::types::{EncodeAttempt, FitParameters, FitResult, FitStage, BYTES_PER_MB};
use crate::image_pipeline::jpeg::{EncodeOptions, JpegWriter};

fn as_mb(bytes: usize) -> f64 {
    bytes as f64 / BYTES_PER_MB as f64
}

/// Encodes once, retrying the same quality without optimization when the
/// writer rejects the optimize option. Any other error is returned as-is.
fn encode_with_retry<W: JpegWriter + ?Sized>(
    writer: &W,
    image: &PixelBuffer,
    quality: u8,
    options: &EncodeOptions,
) -> std::result::Result<Vec<u8>, JpegEncodeError> {
    match writer.encode_jpeg(image, quality, options) {
        Err(e) if e.is_option_rejection() && options.optimize => {
            warn!(quality, "{}; retrying without optimize", e);
            writer.encode_jpeg(image, quality, &options.without_optimize())
        }
        other => other,
    }
}

/// Searches quality and resolution for the best encoding of `image` that
/// fits `params.max_bytes`.
///
/// For each resolution tier, starting at native, qualities are tried from
/// `initial_quality` down to `min_quality`; the first encoding within budget
/// is returned. When a whole descent fails the image is shrunk by
/// `resize_factor` and the descent restarts, until the next tier would drop
/// below the minimum dimensions. The last tier is then encoded at
/// `min_quality` and returned whether or not it fits.
///
/// # Errors
///
/// * `ConversionError::InvalidParameters` - `params` fail validation
/// * `ConversionError::EncodeError` - the writer failed for a reason other
///   than a rejected optimize option
#[instrument(skip_all, fields(max_bytes = params.max_bytes))]
pub fn fit_to_budget<W: JpegWriter + ?Sized>(
    writer: &W,
    image: PixelBuffer,
    params: &FitParameters,
) -> Result<FitResult> {
    params.validate()?;

    let budget = params.max_bytes;
    let mut candidate = image;
    let mut attempts = Vec::new();
    let mut downscales = 0;

    loop {
        let (width, height) = candidate.dimensions();
        debug!(width, height, "Starting quality descent");

        for quality in params.quality_ladder() {
            let jpeg = encode_with_retry(writer, &candidate, quality, &params.encode_options)?;
            let size = jpeg.len();
            attempts.push(EncodeAttempt { quality, width, height, size });
            info!("Try: quality={}, size={:.2} MB", quality, as_mb(size));

            if size as u64 <= budget {
                return Ok(FitResult {
                    jpeg,
                    quality,
                    width,
                    height,
                    within_budget: true,
                    stage: FitStage::QualityDescent,
                    attempts,
                    downscales,
                });
            }
        }

        let (new_width, new_height) = shrink_dimensions(width, height, params.resize_factor);
        if new_width < params.min_width || new_height < params.min_height {
            info!("Cannot reduce image further without going below minimum dimensions.");
            break;
        }

        candidate = downscale(&candidate, new_width, new_height);
        downscales += 1;
        info!(
            "Downscaled to {}x{} and retrying (reset quality to {})",
            new_width, new_height, params.initial_quality
        );
    }

    let (width, height) = candidate.dimensions();
    let quality = params.min_quality;
    let jpeg = encode_with_retry(writer, &candidate, quality, &params.encode_options)?;
    let within_budget = jpeg.len() as u64 <= budget;
    debug!(width, height, size = jpeg.len(), within_budget, "Fallback encode");

    Ok(FitResult {
        jpeg,
        quality,
        width,
        height,
        within_budget,
        stage: FitStage::Fallback,
        attempts,
        downscales,
    })
}
