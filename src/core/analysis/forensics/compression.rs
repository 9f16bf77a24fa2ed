// src/core/analysis/forensics/compression.rs
//
// Block-variance compression analysis: JPEG encodes in 8x8 blocks, and a
// genuinely compressed capture shows a meaningful share of low-variance
// ("uniform") blocks. The probe only judges JPEG input; other formats get
// the documented neutral score.

use crate::core::cancel::CancelToken;
use crate::core::config::AnalysisConfig;
use crate::core::decoder::ImageData;
use crate::core::result::{Confidence, ForensicProbeResult, ProbeKind};
use crate::core::signal::clamp01;

const BLOCK: usize = 8;
/// Variance below this marks a block as uniform.
const UNIFORM_VARIANCE: f64 = 100.0;
/// Fixed neutral score for non-JPEG input, where block statistics say
/// nothing about compression history.
const NON_JPEG_SCORE: f64 = 0.7;

pub fn run(
    image: &ImageData,
    _config: &AnalysisConfig,
    cancel: &CancelToken,
) -> ForensicProbeResult {
    if !image.is_jpeg() {
        return ForensicProbeResult::new(ProbeKind::Compression, NON_JPEG_SCORE, Confidence::Low)
            .with_metric("skipped", true)
            .with_metric("formato", image.format_name.clone());
    }

    let lum = image.luminance();
    if lum.is_empty() || image.width < BLOCK || image.height < BLOCK {
        return ForensicProbeResult::errored(
            ProbeKind::Compression,
            "imagen demasiado pequeña para análisis de bloques",
        );
    }

    let blocks_x = image.width / BLOCK;
    let blocks_y = image.height / BLOCK;
    let mut uniform = 0u64;
    let mut total = 0u64;

    for by in 0..blocks_y {
        if cancel.is_cancelled() {
            return ForensicProbeResult::errored(
                ProbeKind::Compression,
                "análisis cancelado por tiempo",
            );
        }
        for bx in 0..blocks_x {
            let variance = block_variance(&lum, image.width, bx * BLOCK, by * BLOCK);
            if variance < UNIFORM_VARIANCE {
                uniform += 1;
            }
            total += 1;
        }
    }

    if total == 0 {
        return ForensicProbeResult::errored(ProbeKind::Compression, "sin bloques completos");
    }

    let uniform_ratio = uniform as f64 / total as f64;
    let score = clamp01((uniform_ratio * 1.5).min(1.0));

    ForensicProbeResult::new(ProbeKind::Compression, score, Confidence::Medium)
        .with_metric("uniformRatio", uniform_ratio)
        .with_metric("totalBlocks", total as f64)
}

fn block_variance(lum: &[u8], width: usize, x0: usize, y0: usize) -> f64 {
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for y in y0..y0 + BLOCK {
        for x in x0..x0 + BLOCK {
            let v = lum[y * width + x] as f64;
            sum += v;
            sum_sq += v * v;
        }
    }
    let n = (BLOCK * BLOCK) as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testgen;

    #[test]
    fn test_non_jpeg_gets_neutral_score() {
        let image = testgen::uniform_gray(64, 64, 128); // png-flavored fixture
        let result = run(&image, &AnalysisConfig::default(), &CancelToken::none());
        assert_eq!(result.score, Some(NON_JPEG_SCORE));
        assert_eq!(result.confidence, Confidence::Low);
    }

    #[test]
    fn test_flat_jpeg_is_fully_uniform() {
        let image = testgen::jpeg_roundtrip(&testgen::uniform_gray(64, 64, 128), 90);
        let result = run(&image, &AnalysisConfig::default(), &CancelToken::none());
        // Every block has near-zero variance: ratio 1.0, capped score 1.0
        assert_eq!(result.score, Some(1.0));
    }

    #[test]
    fn test_noise_jpeg_has_low_uniform_ratio() {
        let image = testgen::jpeg_roundtrip(&testgen::noise_image(64, 64, 5), 90);
        let result = run(&image, &AnalysisConfig::default(), &CancelToken::none());
        // Full-range noise keeps block variance high even after JPEG
        assert!(result.score.unwrap() < 0.5);
    }

    #[test]
    fn test_block_variance_flat() {
        let lum = vec![50u8; 64];
        assert_eq!(block_variance(&lum, 8, 0, 0), 0.0);
    }
}
