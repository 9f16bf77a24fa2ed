// src/core/analysis/forensics/ela.rs
//
// Error Level Analysis: recompress the decoded image as JPEG at a fixed
// quality and measure how far the recompressed pixels drift from the
// original decode. Regions with inconsistent compression history drift
// more; a pristine single-compression capture drifts uniformly little.

use std::io::Cursor;

use crate::core::cancel::CancelToken;
use crate::core::config::AnalysisConfig;
use crate::core::decoder::ImageData;
use crate::core::result::{Confidence, ForensicProbeResult, ProbeKind};
use crate::core::signal::clamp01;

/// Per-pixel mean difference above this counts as "significant".
const SIGNIFICANT_DIFF: f64 = 15.0;
/// Thresholds for the manipulation verdict raw metric.
const MANIPULATION_AVG: f64 = 25.0;
const MANIPULATION_RATIO: f64 = 0.15;

pub fn run(image: &ImageData, config: &AnalysisConfig, cancel: &CancelToken) -> ForensicProbeResult {
    let recompressed = match recompress(image, config.ela_quality) {
        Ok(pixels) => pixels,
        Err(e) => {
            return ForensicProbeResult::errored(
                ProbeKind::Ela,
                format!("recompresión fallida: {e}"),
            )
        }
    };

    if recompressed.len() != image.pixels.len() {
        return ForensicProbeResult::errored(
            ProbeKind::Ela,
            "la recompresión produjo un buffer de tamaño inesperado",
        );
    }

    let total_pixels = image.width * image.height;
    if total_pixels == 0 {
        return ForensicProbeResult::errored(ProbeKind::Ela, "imagen vacía");
    }

    let mut diff_sum = 0.0;
    let mut significant = 0u64;
    for (i, (orig, recomp)) in image
        .pixels
        .chunks_exact(image.channels)
        .zip(recompressed.chunks_exact(image.channels))
        .enumerate()
    {
        // Cancellation between row-sized strides, not per pixel
        if i % (image.width.max(1) * 64) == 0 && cancel.is_cancelled() {
            return ForensicProbeResult::errored(ProbeKind::Ela, "análisis cancelado por tiempo");
        }

        let mut px_diff = 0.0;
        for (&a, &b) in orig.iter().zip(recomp).take(3) {
            px_diff += (a as f64 - b as f64).abs();
        }
        px_diff /= 3.0;
        diff_sum += px_diff;
        if px_diff > SIGNIFICANT_DIFF {
            significant += 1;
        }
    }

    let avg_difference = diff_sum / total_pixels as f64;
    let significant_ratio = significant as f64 / total_pixels as f64;
    let manipulation_likely =
        avg_difference > MANIPULATION_AVG || significant_ratio > MANIPULATION_RATIO;

    let score = clamp01(1.0 - avg_difference / 50.0);
    let confidence = if image.is_jpeg() {
        Confidence::High
    } else {
        Confidence::Medium
    };

    ForensicProbeResult::new(ProbeKind::Ela, score, confidence)
        .with_metric("avgDifference", avg_difference)
        .with_metric("significantRatio", significant_ratio)
        .with_metric("manipulationLikely", manipulation_likely)
        .with_metric("quality", config.ela_quality as f64)
}

/// Re-encode the RGB pixels as JPEG at `quality` and decode them back.
fn recompress(image: &ImageData, quality: u8) -> anyhow::Result<Vec<u8>> {
    let mut encoded = Cursor::new(Vec::new());
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut encoded, quality);
    encoder.encode(
        &image.pixels,
        image.width as u32,
        image.height as u32,
        image::ExtendedColorType::Rgb8,
    )?;

    let decoded = image::load_from_memory(encoded.get_ref())?;
    Ok(decoded.to_rgb8().into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testgen;

    #[test]
    fn test_flat_image_scores_high() {
        // A flat image survives recompression nearly unchanged
        let image = testgen::uniform_gray(64, 64, 128);
        let result = run(&image, &AnalysisConfig::default(), &CancelToken::none());
        assert!(result.score.unwrap() > 0.9);
    }

    #[test]
    fn test_score_decreases_with_difference() {
        // The mapping 1 - avg/50 is strictly decreasing in the average diff
        assert!(clamp01(1.0 - 5.0 / 50.0) > clamp01(1.0 - 20.0 / 50.0));
        assert!(clamp01(1.0 - 20.0 / 50.0) > clamp01(1.0 - 45.0 / 50.0));
    }

    #[test]
    fn test_noise_image_has_larger_difference_than_flat() {
        let config = AnalysisConfig::default();
        let flat = run(
            &testgen::uniform_gray(64, 64, 128),
            &config,
            &CancelToken::none(),
        );
        let noisy = run(
            &testgen::noise_image(64, 64, 3),
            &config,
            &CancelToken::none(),
        );
        // High-frequency noise is what JPEG discards first
        assert!(noisy.score.unwrap() < flat.score.unwrap());
    }

    #[test]
    fn test_cancelled_probe_is_excluded() {
        let token = CancelToken::none();
        token.cancel();
        let image = testgen::uniform_gray(64, 64, 128);
        let result = run(&image, &AnalysisConfig::default(), &token);
        assert_eq!(result.score, None);
        assert_eq!(result.confidence, Confidence::Error);
    }
}
