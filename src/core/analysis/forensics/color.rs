// src/core/analysis/forensics/color.rs
//
// Channel-variance consistency probe: natural captures keep the R/G/B
// variances in the same ballpark; heavy grading and some generators skew
// one channel far from the others.

use crate::core::cancel::CancelToken;
use crate::core::config::AnalysisConfig;
use crate::core::decoder::ImageData;
use crate::core::result::{Confidence, ForensicProbeResult, ProbeKind};
use crate::core::signal::clamp01;

pub fn run(
    image: &ImageData,
    _config: &AnalysisConfig,
    cancel: &CancelToken,
) -> ForensicProbeResult {
    if image.channels < 3 || image.pixels.len() < image.channels {
        return ForensicProbeResult::errored(
            ProbeKind::Color,
            "se requieren al menos 3 canales de color",
        );
    }

    let mut sums = [0.0f64; 3];
    let mut sum_sqs = [0.0f64; 3];
    let mut count = 0u64;

    for (i, px) in image.pixels.chunks_exact(image.channels).enumerate() {
        if i % (image.width.max(1) * 64) == 0 && cancel.is_cancelled() {
            return ForensicProbeResult::errored(ProbeKind::Color, "análisis cancelado por tiempo");
        }
        for c in 0..3 {
            let v = px[c] as f64;
            sums[c] += v;
            sum_sqs[c] += v * v;
        }
        count += 1;
    }

    if count == 0 {
        return ForensicProbeResult::errored(ProbeKind::Color, "imagen vacía");
    }

    let n = count as f64;
    let variances: Vec<f64> = (0..3)
        .map(|c| {
            let mean = sums[c] / n;
            (sum_sqs[c] / n - mean * mean).max(0.0)
        })
        .collect();

    let min_var = variances.iter().cloned().fold(f64::MAX, f64::min);
    let max_var = variances.iter().cloned().fold(0.0f64, f64::max);

    // Degenerate flat channels: no judgement possible, neutral ratio
    let ratio = if max_var < 1e-9 { 0.5 } else { min_var / max_var };
    let score = clamp01(0.7 * ratio + 0.3);

    ForensicProbeResult::new(ProbeKind::Color, score, Confidence::Medium)
        .with_metric("varianzaR", variances[0])
        .with_metric("varianzaG", variances[1])
        .with_metric("varianzaB", variances[2])
        .with_metric("ratioVarianza", ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testgen;

    #[test]
    fn test_balanced_noise_scores_high() {
        // Identical per-channel noise distributions: ratio near 1
        let image = testgen::noise_image(64, 64, 21);
        let result = run(&image, &AnalysisConfig::default(), &CancelToken::none());
        assert!(result.score.unwrap() > 0.85);
    }

    #[test]
    fn test_flat_image_is_neutral() {
        let image = testgen::uniform_gray(32, 32, 128);
        let result = run(&image, &AnalysisConfig::default(), &CancelToken::none());
        // All variances zero: neutral ratio 0.5 -> 0.7*0.5 + 0.3
        assert!((result.score.unwrap() - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_single_channel_variance_scores_low() {
        // Red varies, green/blue flat: min/max ratio collapses to 0
        let mut image = testgen::uniform_gray(64, 64, 128);
        for (i, px) in image.pixels.chunks_exact_mut(3).enumerate() {
            px[0] = ((i * 37) % 256) as u8;
        }
        let result = run(&image, &AnalysisConfig::default(), &CancelToken::none());
        assert!((result.score.unwrap() - 0.3).abs() < 1e-6);
    }
}
