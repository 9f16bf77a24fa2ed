// src/core/analysis/texture.rs
//
// Texture/pattern analyzer: ten texture statistics over randomized windowed
// samples of the luminance plane, plus a multi-scale structural
// self-similarity metric that flags repetitive synthetic textures.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

use crate::core::cancel::CancelToken;
use crate::core::config::AnalysisConfig;
use crate::core::decoder::ImageData;
use crate::core::result::{AnalyzerResult, Confidence};
use crate::core::signal::{
    clamp01, clamp_score, extract_block, gaussian_pyramid, histogram_entropy, sobel, ssim,
};

pub const NAME: &str = "textura";
pub const VERSION: &str = "3.0.1";

/// Sampling window side length.
const WINDOW: usize = 8;
/// SSIM block side for the repetitive-pattern metric.
const PATTERN_BLOCK: usize = 5;
/// Quadrant mean ratio above which illumination correction kicks in.
const ILLUMINATION_RATIO: f64 = 1.4;

/// The ten texture features, each in [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureFeatures {
    pub complexity: f64,
    pub uniformity: f64,
    pub repetitive_pattern: f64,
    pub local_variation: f64,
    pub edge_density: f64,
    pub micro_contrast: f64,
    pub textural_scale: f64,
    pub anisotropy: f64,
    pub roughness: f64,
    pub entropy: f64,
}

/// (weight, inverted). Inverted features contribute `1 - f`: uniformity,
/// repetitive pattern, micro-contrast and anisotropy all read as synthetic
/// when high. Weights sum to 1.0.
const FEATURE_WEIGHTS: [(f64, bool); 10] = [
    (0.15, false), // complexity
    (0.10, true),  // uniformity
    (0.20, true),  // repetitive pattern
    (0.10, false), // local variation
    (0.10, false), // edge density
    (0.05, true),  // micro contrast
    (0.08, false), // textural scale
    (0.07, true),  // anisotropy
    (0.05, false), // roughness
    (0.10, false), // entropy
];

pub fn analyze_texture(
    image: &ImageData,
    config: &AnalysisConfig,
    cancel: &CancelToken,
) -> AnalyzerResult {
    let started = Instant::now();

    let lum = image.luminance();
    if lum.is_empty() {
        let mut failed =
            AnalyzerResult::failure(NAME, VERSION, "no se pudo obtener el canal de luminancia");
        failed.duration_ms = started.elapsed().as_millis() as u64;
        return failed;
    }
    if image.width < 2 * WINDOW || image.height < 2 * WINDOW {
        let mut result = AnalyzerResult::new(NAME, VERSION);
        result.confidence = Confidence::Low;
        result = result.with_detail(
            "mensaje",
            "imagen demasiado pequeña para el análisis de textura",
        );
        result.duration_ms = started.elapsed().as_millis() as u64;
        return result;
    }

    let raw_correlation = match repetitive_pattern_raw(&lum, image.width, image.height, cancel) {
        Some(c) => c,
        None => {
            let mut failed =
                AnalyzerResult::failure(NAME, VERSION, "análisis cancelado por tiempo");
            failed.duration_ms = started.elapsed().as_millis() as u64;
            return failed;
        }
    };

    let (features, illumination_corrected) =
        match compute_features(&lum, image.width, image.height, raw_correlation, config, cancel) {
            Some(f) => f,
            None => {
                let mut failed =
                    AnalyzerResult::failure(NAME, VERSION, "análisis cancelado por tiempo");
                failed.duration_ms = started.elapsed().as_millis() as u64;
                return failed;
            }
        };

    let score = composite_score(&features);

    let mut result = AnalyzerResult::new(NAME, VERSION)
        .with_detail("complejidad", features.complexity)
        .with_detail("uniformidad", features.uniformity)
        .with_detail("patronRepetitivo", features.repetitive_pattern)
        .with_detail("correlacionCruda", raw_correlation)
        .with_detail("variacionLocal", features.local_variation)
        .with_detail("densidadBordes", features.edge_density)
        .with_detail("microContraste", features.micro_contrast)
        .with_detail("escalaTextural", features.textural_scale)
        .with_detail("anisotropia", features.anisotropy)
        .with_detail("rugosidad", features.roughness)
        .with_detail("entropiaGlobal", features.entropy);
    result.score = Some(score);
    result.confidence = Confidence::High;
    result.metadata.insert(
        "correccionIluminacion".into(),
        illumination_corrected.into(),
    );
    result.duration_ms = started.elapsed().as_millis() as u64;
    result
}

/// Weighted composite over the ten features, mapped to [0, 10].
/// High score means natural/organic texture.
fn composite_score(f: &TextureFeatures) -> f64 {
    let values = [
        f.complexity,
        f.uniformity,
        f.repetitive_pattern,
        f.local_variation,
        f.edge_density,
        f.micro_contrast,
        f.textural_scale,
        f.anisotropy,
        f.roughness,
        f.entropy,
    ];

    let sum: f64 = values
        .iter()
        .zip(FEATURE_WEIGHTS)
        .map(|(&v, (w, inverted))| w * if inverted { 1.0 - v } else { v })
        .sum();

    clamp_score(sum * 10.0)
}

/// Multi-scale structural self-similarity.
///
/// Builds a 3-level pyramid; at each level tests horizontal offsets of 5%
/// and 15% of the level width by comparing 5x5 blocks against their shifted
/// counterparts with SSIM. Per-level correlation is weighted by
/// `1 - 0.15*level`; near-perfect values (> 0.95) are discounted by 0.8
/// before weighting so saturated self-similarity does not dominate.
/// Returns the maximum weighted correlation; `None` on cancellation.
pub fn repetitive_pattern_raw(
    lum: &[u8],
    width: usize,
    height: usize,
    cancel: &CancelToken,
) -> Option<f64> {
    let pyramid = gaussian_pyramid(lum, width, height, 3);
    let mut best: f64 = 0.0;

    for (level, pl) in pyramid.iter().enumerate() {
        for fraction in [0.05, 0.15] {
            let offset = ((pl.width as f64 * fraction) as usize).max(1);
            if offset + PATTERN_BLOCK >= pl.width || PATTERN_BLOCK >= pl.height {
                continue;
            }

            let x_range = pl.width - offset - PATTERN_BLOCK;
            let y_range = pl.height - PATTERN_BLOCK;
            let step_x = (x_range / 8).max(1);
            let step_y = (y_range / 8).max(1);

            let mut sum = 0.0;
            let mut count = 0u32;
            let mut y = 0;
            while y <= y_range {
                if cancel.is_cancelled() {
                    return None;
                }
                let mut x = 0;
                while x <= x_range {
                    let a = extract_block(&pl.data, pl.width, pl.height, x, y, PATTERN_BLOCK);
                    let b = extract_block(
                        &pl.data,
                        pl.width,
                        pl.height,
                        x + offset,
                        y,
                        PATTERN_BLOCK,
                    );
                    if let (Some(a), Some(b)) = (a, b) {
                        sum += ssim(&a, &b);
                        count += 1;
                    }
                    x += step_x;
                }
                y += step_y;
            }

            if count == 0 {
                continue;
            }
            let mut correlation = sum / count as f64;
            if correlation > 0.95 {
                correlation *= 0.8;
            }
            let weighted = correlation * (1.0 - 0.15 * level as f64);
            best = best.max(weighted);
        }
    }

    Some(best.max(0.0))
}

/// Threshold mapping for the repetitive-pattern feature:
/// `clamp(x^1.5, 0.01, 1)`.
pub fn map_pattern_score(raw: f64) -> f64 {
    raw.max(0.0).powf(1.5).clamp(0.01, 1.0)
}

fn compute_features(
    lum: &[u8],
    width: usize,
    height: usize,
    raw_correlation: f64,
    config: &AnalysisConfig,
    cancel: &CancelToken,
) -> Option<(TextureFeatures, bool)> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    // Illumination pass: per-quadrant mean luminance. Strong vignetting or
    // lighting gradients otherwise read as false texture.
    let quadrant_means = quadrant_means(lum, width, height);
    let q_min = quadrant_means.iter().cloned().fold(f64::MAX, f64::min);
    let q_max = quadrant_means.iter().cloned().fold(0.0f64, f64::max);
    let illumination_corrected = q_min > 1e-6 && q_max / q_min > ILLUMINATION_RATIO;

    // Sampling density scales with image size, capped at max_samples.
    // Stratified per quadrant so a bright corner cannot dominate.
    let total_samples = ((width * height) / 2_000).clamp(50, config.max_samples);
    let per_quadrant = (total_samples / 4).max(1);

    let mut window_means = Vec::with_capacity(total_samples);
    let mut window_stddevs = Vec::with_capacity(total_samples);
    let mut micro_sum = 0.0;
    let mut rough_sum = 0.0;
    let mut edge_hits = 0u32;
    let mut aniso_x = 0.0;
    let mut aniso_y = 0.0;
    let mut aniso_mag = 0.0;
    let mut sample_count = 0u32;

    for quadrant in 0..4 {
        let (qx, qy) = (quadrant % 2, quadrant / 2);
        let x0 = qx * (width / 2);
        let y0 = qy * (height / 2);
        let x_span = (width / 2).saturating_sub(WINDOW).max(1);
        let y_span = (height / 2).saturating_sub(WINDOW).max(1);

        for _ in 0..per_quadrant {
            if cancel.is_cancelled() {
                return None;
            }
            let x = x0 + rng.gen_range(0..x_span);
            let y = y0 + rng.gen_range(0..y_span);
            let Some(window) = extract_block(lum, width, height, x, y, WINDOW) else {
                continue;
            };

            let n = window.len() as f64;
            let mean = window.iter().map(|&v| v as f64).sum::<f64>() / n;
            let var = window
                .iter()
                .map(|&v| {
                    let d = v as f64 - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            let min = *window.iter().min().unwrap_or(&0) as f64;
            let max = *window.iter().max().unwrap_or(&0) as f64;

            // Horizontal first differences inside the window
            let mut diff_sum = 0.0;
            for row in window.chunks_exact(WINDOW) {
                for pair in row.windows(2) {
                    diff_sum += (pair[0] as f64 - pair[1] as f64).abs();
                }
            }
            rough_sum += diff_sum / (WINDOW * (WINDOW - 1)) as f64;

            let g = sobel(lum, width, height, x + WINDOW / 2, y + WINDOW / 2);
            if g.magnitude > 40.0 {
                edge_hits += 1;
            }
            // Doubled angles: axial orientation concentration
            aniso_x += g.magnitude * (2.0 * g.angle).cos();
            aniso_y += g.magnitude * (2.0 * g.angle).sin();
            aniso_mag += g.magnitude;

            window_means.push(mean);
            window_stddevs.push(var.sqrt());
            micro_sum += (max - min) / 255.0;
            sample_count += 1;
        }
    }

    if sample_count == 0 {
        return Some((TextureFeatures::default(), illumination_corrected));
    }
    let n = sample_count as f64;

    let mean_stddev = window_stddevs.iter().sum::<f64>() / n;
    let complexity = clamp01(mean_stddev / 48.0);
    let mut uniformity = window_stddevs.iter().filter(|&&s| s < 6.0).count() as f64 / n;
    let mut local_variation = clamp01(
        window_means
            .windows(2)
            .map(|w| (w[0] - w[1]).abs())
            .sum::<f64>()
            / (n - 1.0).max(1.0)
            / 48.0,
    );
    let edge_density = edge_hits as f64 / n;
    let micro_contrast = clamp01(micro_sum / n);
    let roughness = clamp01(rough_sum / n / 32.0);

    let anisotropy = if aniso_mag > 1e-6 {
        clamp01((aniso_x * aniso_x + aniso_y * aniso_y).sqrt() / aniso_mag)
    } else {
        0.5
    };

    let textural_scale = textural_scale(lum, width, height, mean_stddev);
    let entropy = histogram_entropy(lum);

    // Bias uneven-lighting samples toward neutral: a lighting gradient is
    // not texture.
    if illumination_corrected {
        uniformity = 0.5 + (uniformity - 0.5) * 0.5;
        local_variation = 0.5 + (local_variation - 0.5) * 0.5;
    }

    let features = TextureFeatures {
        complexity,
        uniformity,
        repetitive_pattern: map_pattern_score(raw_correlation),
        local_variation,
        edge_density,
        micro_contrast,
        textural_scale,
        anisotropy,
        roughness,
        entropy,
    };

    Some((features, illumination_corrected))
}

fn quadrant_means(lum: &[u8], width: usize, height: usize) -> [f64; 4] {
    let mut sums = [0.0f64; 4];
    let mut counts = [0u64; 4];
    for y in 0..height {
        for x in 0..width {
            let q = (y * 2 / height.max(1)).min(1) * 2 + (x * 2 / width.max(1)).min(1);
            sums[q] += lum[y * width + x] as f64;
            counts[q] += 1;
        }
    }
    let mut means = [0.0f64; 4];
    for i in 0..4 {
        if counts[i] > 0 {
            means[i] = sums[i] / counts[i] as f64;
        }
    }
    means
}

/// Coarse-to-fine detail ratio from a 3-level pyramid. Neutral 0.5 when the
/// fine level carries no detail at all.
fn textural_scale(lum: &[u8], width: usize, height: usize, fine_stddev: f64) -> f64 {
    if fine_stddev < 1e-6 {
        return 0.5;
    }
    let pyramid = gaussian_pyramid(lum, width, height, 3);
    let coarse = match pyramid.last() {
        Some(level) => level,
        None => return 0.5,
    };
    let (_, coarse_stddev) = crate::core::signal::mean_stddev(&coarse.data);
    clamp01(coarse_stddev / fine_stddev / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testgen;

    #[test]
    fn test_feature_weights_sum_to_one() {
        let sum: f64 = FEATURE_WEIGHTS.iter().map(|(w, _)| w).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_uniform_gray_scores_synthetic() {
        // Flat 256x256 gray: near-perfect self-similarity, discounted and
        // mapped, still lands the final score in the low-naturalness band.
        let image = testgen::uniform_gray(256, 256, 128);
        let result = analyze_texture(&image, &AnalysisConfig::default(), &CancelToken::none());
        assert!(result.score.unwrap() < 5.0);
    }

    #[test]
    fn test_uniform_gray_raw_correlation_discounted() {
        let image = testgen::uniform_gray(256, 256, 128);
        let lum = image.luminance();
        let raw = repetitive_pattern_raw(&lum, 256, 256, &CancelToken::none()).unwrap();
        // SSIM of identical flat blocks is 1.0; the >0.95 discount caps the
        // level-0 weighted correlation at 0.8.
        assert!((raw - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_pattern_mapping_bounds() {
        assert_eq!(map_pattern_score(0.0), 0.01);
        assert!((map_pattern_score(1.0) - 1.0).abs() < 1e-9);
        assert!(map_pattern_score(0.8) < 0.8);
    }

    #[test]
    fn test_seeded_sampling_is_deterministic() {
        let image = testgen::noise_image(200, 200, 42);
        let config = AnalysisConfig::default();
        let a = analyze_texture(&image, &config, &CancelToken::none());
        let b = analyze_texture(&image, &config, &CancelToken::none());
        assert_eq!(a.score, b.score);
        assert_eq!(a.details, b.details);
    }

    #[test]
    fn test_uneven_illumination_damps_uniformity() {
        use crate::core::result::DetailValue;

        // Left half dark, right half bright: quadrant means diverge far past
        // the 1.4x ratio, so the correction engages.
        let (w, h) = (128usize, 128usize);
        let mut pixels = Vec::with_capacity(w * h * 3);
        for _ in 0..h {
            for x in 0..w {
                let v = if x < w / 2 { 40 } else { 220 };
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        let image = testgen::from_rgb(w, h, pixels);
        let result = analyze_texture(&image, &AnalysisConfig::default(), &CancelToken::none());

        assert_eq!(
            result.metadata.get("correccionIluminacion"),
            Some(&DetailValue::Flag(true))
        );
        // Every sampled window sits inside one flat half, so raw uniformity
        // is exactly 1.0 and the correction damps it halfway to neutral.
        match result.details.get("uniformidad") {
            Some(DetailValue::Number(u)) => assert!((u - 0.75).abs() < 1e-9),
            other => panic!("expected number, got {:?}", other),
        }

        // Evenly lit control: no correction
        let flat = testgen::uniform_gray(128, 128, 128);
        let control = analyze_texture(&flat, &AnalysisConfig::default(), &CancelToken::none());
        assert_eq!(
            control.metadata.get("correccionIluminacion"),
            Some(&DetailValue::Flag(false))
        );
    }

    #[test]
    fn test_noise_scores_higher_than_flat() {
        let noise = testgen::noise_image(128, 128, 9);
        let flat = testgen::uniform_gray(128, 128, 128);
        let config = AnalysisConfig::default();
        let noise_score =
            analyze_texture(&noise, &config, &CancelToken::none()).score.unwrap();
        let flat_score = analyze_texture(&flat, &config, &CancelToken::none()).score.unwrap();
        assert!(noise_score > flat_score);
    }
}
