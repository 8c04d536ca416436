use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use crate::image_pipeline::common::error::{ConversionError, JpegEncodeError};
use crate::image_pipeline::debayer::types::PixelBuffer;
use crate::image_pipeline::fit::{fit_to_budget, shrink_dimensions, FitParameters, FitStage};
use crate::image_pipeline::jpeg::{EncodeOptions, JpegWriter, StandardJpegWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Call {
    quality: u8,
    width: u32,
    height: u32,
    optimize: bool,
}

/// Writer whose output size is a pure function of quality and resolution.
struct ModelWriter {
    model: fn(u8, u32, u32) -> usize,
    reject_optimize: bool,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ModelWriter {
    fn new(model: fn(u8, u32, u32) -> usize) -> Self {
        Self {
            model,
            reject_optimize: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn rejecting_optimize(mut self) -> Self {
        self.reject_optimize = true;
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl JpegWriter for ModelWriter {
    fn encode_jpeg(
        &self,
        image: &PixelBuffer,
        quality: u8,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, JpegEncodeError> {
        let (width, height) = image.dimensions();
        self.calls.lock().unwrap().push(Call {
            quality,
            width,
            height,
            optimize: options.optimize,
        });
        if self.reject_optimize && options.optimize {
            return Err(JpegEncodeError::OptimizeUnsupported { width, height });
        }
        Ok(vec![0u8; (self.model)(quality, width, height)])
    }
}

struct FailingWriter;

impl JpegWriter for FailingWriter {
    fn encode_jpeg(
        &self,
        _image: &PixelBuffer,
        _quality: u8,
        _options: &EncodeOptions,
    ) -> Result<Vec<u8>, JpegEncodeError> {
        Err(JpegEncodeError::Encoder("Mock encode error".to_string()))
    }
}

/// Size grows with area and, more weakly, with quality.
fn area_model(quality: u8, width: u32, height: u32) -> usize {
    (width as usize * height as usize) * (400 + quality as usize) / 400
}

fn blank(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_pixel(width, height, image::Rgb([90, 120, 150]))
}

fn noise(width: u32, height: u32) -> PixelBuffer {
    let mut state: u32 = 0x1234_5678;
    PixelBuffer::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        image::Rgb([next(), next(), next()])
    })
}

#[test]
fn test_default_parameters() {
    let params = FitParameters::default();

    assert_eq!(params.max_bytes, 5 * 1_048_576);
    assert_eq!(params.initial_quality, 95);
    assert_eq!(params.min_quality, 25);
    assert_eq!(params.quality_step, 5);
    assert_eq!(params.resize_factor, 0.9);
    assert_eq!((params.min_width, params.min_height), (400, 300));
    assert!(params.encode_options.optimize);
    assert!(params.validate().is_ok());
}

#[test]
fn test_builder_overrides() {
    let params = FitParameters::builder()
        .max_output_mb(0.5)
        .initial_quality(90)
        .min_quality(40)
        .quality_step(10)
        .resize_factor(0.75)
        .min_dimensions(10, 20)
        .encode_options(EncodeOptions::default().without_optimize())
        .build();

    assert_eq!(params.max_bytes, 524_288);
    assert_eq!(params.initial_quality, 90);
    assert_eq!(params.min_quality, 40);
    assert_eq!(params.quality_step, 10);
    assert_eq!(params.resize_factor, 0.75);
    assert_eq!((params.min_width, params.min_height), (10, 20));
    assert!(!params.encode_options.optimize);
}

#[test]
fn test_quality_ladder() {
    let ladder: Vec<u8> = FitParameters::default().quality_ladder().collect();
    assert_eq!(ladder.len(), 15);
    assert_eq!(ladder.first(), Some(&95));
    assert_eq!(ladder.last(), Some(&25));

    let params = FitParameters::builder()
        .initial_quality(90)
        .min_quality(25)
        .quality_step(20)
        .build();
    assert_eq!(params.quality_ladder().collect::<Vec<_>>(), vec![90, 70, 50, 30]);

    let params = FitParameters::builder()
        .initial_quality(60)
        .min_quality(60)
        .build();
    assert_eq!(params.quality_ladder().collect::<Vec<_>>(), vec![60]);
}

#[test]
fn test_invalid_parameters_are_rejected() {
    let cases = [
        FitParameters::builder().max_bytes(0).build(),
        FitParameters::builder().initial_quality(0).min_quality(0).build(),
        FitParameters::builder().initial_quality(101).build(),
        FitParameters::builder().initial_quality(30).min_quality(40).build(),
        FitParameters::builder().quality_step(0).build(),
        FitParameters::builder().resize_factor(1.0).build(),
        FitParameters::builder().resize_factor(0.0).build(),
        FitParameters::builder().resize_factor(f64::NAN).build(),
        FitParameters::builder().min_dimensions(0, 300).build(),
    ];

    for params in cases {
        let writer = ModelWriter::new(area_model);
        let result = fit_to_budget(&writer, blank(10, 10), &params);
        assert!(
            matches!(result, Err(ConversionError::InvalidParameters(_))),
            "{:?} was accepted",
            params
        );
        assert!(writer.calls().is_empty());
    }
}

#[test]
fn test_first_attempt_fits() {
    let writer = ModelWriter::new(area_model);
    let params = FitParameters::builder().max_bytes(1_000_000).build();

    let result = fit_to_budget(&writer, blank(600, 400), &params).unwrap();

    assert!(result.within_budget);
    assert_eq!(result.stage, FitStage::QualityDescent);
    assert_eq!(result.quality, 95);
    assert_eq!((result.width, result.height), (600, 400));
    assert_eq!(result.downscales, 0);
    assert_eq!(result.attempts.len(), 1);
    assert_eq!(writer.calls().len(), 1);
}

#[test]
fn test_fits_after_one_downscale() {
    let writer = ModelWriter::new(area_model);
    let params = FitParameters::builder().max_bytes(234_000).build();

    let result = fit_to_budget(&writer, blank(600, 400), &params).unwrap();

    assert!(result.within_budget);
    assert!(result.size() as u64 <= params.max_bytes);
    assert_eq!(result.stage, FitStage::QualityDescent);
    assert_eq!(result.quality, 80);
    assert_eq!((result.width, result.height), (540, 360));
    assert_eq!(result.downscales, 1);
    // 15 qualities at native, then 95, 90, 85, 80
    assert_eq!(result.attempts.len(), 19);
    assert!(result.attempts[..15].iter().all(|a| (a.width, a.height) == (600, 400)));
    assert_eq!(result.attempts[14].quality, 25);
    assert_eq!(result.attempts[15].quality, 95);
}

#[test]
fn test_unreachable_budget_falls_back_at_floor() {
    let writer = ModelWriter::new(area_model);
    let params = FitParameters::builder().max_bytes(1024).build();

    let result = fit_to_budget(&writer, blank(600, 400), &params).unwrap();

    // 600x400 -> 540x360 -> 486x324; 437x291 would break the 400x300 floor
    assert!(!result.within_budget);
    assert_eq!(result.stage, FitStage::Fallback);
    assert_eq!(result.downscales, 2);
    assert_eq!(result.attempts.len(), 45);
    assert_eq!((result.width, result.height), (486, 324));
    assert_eq!(result.quality, 25);
    assert_eq!(result.size(), area_model(25, 486, 324));

    let calls = writer.calls();
    assert_eq!(calls.len(), 46);
    assert_eq!(
        calls.last(),
        Some(&Call { quality: 25, width: 486, height: 324, optimize: true })
    );
}

#[test]
fn test_floor_at_native_resolution_never_downscales() {
    let writer = ModelWriter::new(area_model);
    let params = FitParameters::builder()
        .max_bytes(1024)
        .min_dimensions(600, 400)
        .build();

    let result = fit_to_budget(&writer, blank(600, 400), &params).unwrap();

    assert_eq!(result.stage, FitStage::Fallback);
    assert_eq!(result.downscales, 0);
    assert_eq!(result.attempts.len(), 15);
    assert_eq!((result.width, result.height), (600, 400));
    assert_eq!(writer.calls().len(), 16);
}

#[test]
fn test_fallback_within_budget_reports_success() {
    // Only reachable when the ladder skips min_quality
    let writer = ModelWriter::new(|quality, _, _| if quality <= 25 { 10 } else { 1000 });
    let params = FitParameters::builder()
        .max_bytes(100)
        .initial_quality(90)
        .quality_step(20)
        .min_dimensions(50, 50)
        .build();

    let result = fit_to_budget(&writer, blank(50, 50), &params).unwrap();

    assert_eq!(result.stage, FitStage::Fallback);
    assert!(result.within_budget);
    assert_eq!(result.quality, 25);
    assert_eq!(result.attempts.len(), 4);
}

#[test]
fn test_rejected_optimize_retries_same_quality() {
    let writer = ModelWriter::new(area_model).rejecting_optimize();
    let params = FitParameters::builder().max_bytes(1_000_000).build();

    let result = fit_to_budget(&writer, blank(600, 400), &params).unwrap();

    assert!(result.within_budget);
    assert_eq!(result.quality, 95);
    assert_eq!(result.attempts.len(), 1);
    let calls = writer.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!((calls[0].quality, calls[0].optimize), (95, true));
    assert_eq!((calls[1].quality, calls[1].optimize), (95, false));
}

#[test]
fn test_fallback_also_retries_without_optimize() {
    let writer = ModelWriter::new(area_model).rejecting_optimize();
    let params = FitParameters::builder()
        .max_bytes(1)
        .min_dimensions(600, 400)
        .build();

    let result = fit_to_budget(&writer, blank(600, 400), &params).unwrap();

    assert_eq!(result.stage, FitStage::Fallback);
    assert_eq!(result.size(), area_model(25, 600, 400));
    let calls = writer.calls();
    assert_eq!(calls.len(), 32);
    let tail = &calls[calls.len() - 2..];
    assert_eq!((tail[0].quality, tail[0].optimize), (25, true));
    assert_eq!((tail[1].quality, tail[1].optimize), (25, false));
}

#[test]
fn test_other_encoder_errors_are_fatal() {
    let result = fit_to_budget(&FailingWriter, blank(600, 400), &FitParameters::default());

    assert!(matches!(
        result,
        Err(ConversionError::EncodeError(JpegEncodeError::Encoder(_)))
    ));
}

#[test]
fn test_real_encoder_meets_budget() {
    let writer = StandardJpegWriter::new();
    let image = noise(200, 150);
    let full = writer
        .encode_jpeg(&image, 95, &EncodeOptions::default())
        .unwrap()
        .len() as u64;
    let params = FitParameters::builder()
        .max_bytes(full / 2)
        .min_dimensions(50, 50)
        .build();

    let result = fit_to_budget(&writer, image, &params).unwrap();

    assert!(result.within_budget);
    assert!(result.size() as u64 <= full / 2);
    assert!(result.quality < 95 || result.downscales > 0);
}

#[test]
fn test_search_is_deterministic() {
    let writer = StandardJpegWriter::new();
    let params = FitParameters::builder()
        .max_bytes(4_000)
        .min_dimensions(40, 30)
        .build();

    let first = fit_to_budget(&writer, noise(120, 90), &params).unwrap();
    let second = fit_to_budget(&writer, noise(120, 90), &params).unwrap();

    assert_eq!(first.jpeg, second.jpeg);
    assert_eq!(first.attempts, second.attempts);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_succeeds_iff_some_setting_fits(budget in 1u64..12_000) {
        let params = FitParameters::builder()
            .max_bytes(budget)
            .min_dimensions(80, 60)
            .build();

        let mut reachable = false;
        let (mut w, mut h) = (120u32, 80u32);
        loop {
            reachable |= params
                .quality_ladder()
                .any(|q| area_model(q, w, h) as u64 <= budget);
            let (nw, nh) = shrink_dimensions(w, h, params.resize_factor);
            if nw < params.min_width || nh < params.min_height {
                break;
            }
            (w, h) = (nw, nh);
        }

        let writer = ModelWriter::new(area_model);
        let result = fit_to_budget(&writer, blank(120, 80), &params).unwrap();

        prop_assert_eq!(result.within_budget, reachable);
        if result.within_budget {
            prop_assert!(result.size() as u64 <= budget);
        }
    }
}
