// src/core/analysis/forensics/noise.rs
//
// Sensor-noise (PRNU approximation) probe: camera sensors imprint a
// spatially persistent noise pattern, so the residual after removing the
// local mean stays autocorrelated. Generated images carry either no
// residual structure or white noise.

use crate::core::cancel::CancelToken;
use crate::core::config::AnalysisConfig;
use crate::core::decoder::ImageData;
use crate::core::result::{Confidence, ForensicProbeResult, ProbeKind};
use crate::core::signal::{clamp01, lag1_autocorrelation};

/// Autocorrelation mapping range: below 0.2 reads as fully synthetic,
/// above 0.9 as fully sensor-like.
const AUTOCORR_LOW: f64 = 0.2;
const AUTOCORR_HIGH: f64 = 0.9;

pub fn run(
    image: &ImageData,
    _config: &AnalysisConfig,
    cancel: &CancelToken,
) -> ForensicProbeResult {
    let lum = image.luminance();
    if lum.is_empty() || image.width < 3 || image.height < 3 {
        return ForensicProbeResult::errored(
            ProbeKind::Noise,
            "imagen demasiado pequeña para análisis de ruido",
        );
    }

    let width = image.width;
    let height = image.height;
    let mut residuals = Vec::with_capacity((width - 2) * (height - 2));

    for y in 1..height - 1 {
        if cancel.is_cancelled() {
            return ForensicProbeResult::errored(ProbeKind::Noise, "análisis cancelado por tiempo");
        }
        for x in 1..width - 1 {
            let center = lum[y * width + x] as f64;
            let neighbors = (lum[(y - 1) * width + x] as f64
                + lum[(y + 1) * width + x] as f64
                + lum[y * width + x - 1] as f64
                + lum[y * width + x + 1] as f64)
                / 4.0;
            residuals.push(center - neighbors);
        }
    }

    let autocorr = lag1_autocorrelation(&residuals);
    let score = clamp01((autocorr - AUTOCORR_LOW) / (AUTOCORR_HIGH - AUTOCORR_LOW));

    let confidence = if residuals.len() > 10_000 {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    ForensicProbeResult::new(ProbeKind::Noise, score, confidence)
        .with_metric("autocorrelacion", autocorr)
        .with_metric("residuales", residuals.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testgen;

    #[test]
    fn test_flat_image_has_zero_autocorrelation() {
        let image = testgen::uniform_gray(64, 64, 128);
        let result = run(&image, &AnalysisConfig::default(), &CancelToken::none());
        // Zero-variance residual maps through the lower bound
        let autocorr = match result.raw_metrics.get("autocorrelacion").unwrap() {
            crate::core::result::DetailValue::Number(n) => *n,
            other => panic!("expected number, got {:?}", other),
        };
        assert_eq!(autocorr, 0.0);
        assert_eq!(result.score, Some(0.0));
    }

    #[test]
    fn test_white_noise_scores_low() {
        let image = testgen::noise_image(128, 128, 11);
        let result = run(&image, &AnalysisConfig::default(), &CancelToken::none());
        // White-noise residual has strongly negative lag-1 autocorrelation
        assert!(result.score.unwrap() < 0.2);
    }

    #[test]
    fn test_tiny_image_errors() {
        let image = testgen::uniform_gray(2, 2, 128);
        let result = run(&image, &AnalysisConfig::default(), &CancelToken::none());
        assert_eq!(result.score, None);
        assert_eq!(result.confidence, Confidence::Error);
    }
}
