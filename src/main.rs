use rawfit_rs::image_pipeline::{ConversionConfig, RawToJpegPipeline};
use rawfit_rs::logger;

use tracing::{info, warn};

const DEFAULT_INPUT: &str = "input.arw";
const DEFAULT_OUTPUT: &str = "output.jpg";

fn main() -> anyhow::Result<()> {
    logger::init()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (input, output) = match args.as_slice() {
        [input, output, ..] => (input.as_str(), output.as_str()),
        _ => (DEFAULT_INPUT, DEFAULT_OUTPUT),
    };

    let pipeline = RawToJpegPipeline::new(ConversionConfig::default());
    let fit = &pipeline.config().fit;
    info!(
        max_bytes = fit.max_bytes,
        initial_quality = fit.initial_quality,
        min_quality = fit.min_quality,
        "RAW to JPEG pipeline initialized"
    );

    if pipeline.convert_file_within_budget(input, output) {
        info!("Conversion succeeded and output is within size limit.");
    } else {
        warn!("Conversion finished but could not reach the size limit (see messages above).");
    }

    Ok(())
}
