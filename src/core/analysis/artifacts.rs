// src/core/analysis/artifacts.rs
//
// Artifact/blockiness analyzer: compression-block detection plus
// GAN/diffusion checkerboard heuristics over the luminance plane.
// Also emits the stable 10-element feature vector consumed by the
// downstream classifier.

use std::time::Instant;

use crate::core::cancel::CancelToken;
use crate::core::config::AnalysisConfig;
use crate::core::decoder::ImageData;
use crate::core::result::{AnalyzerResult, Confidence};
use crate::core::signal::{clamp01, clamp_score, histogram_entropy, histogram_peaks, mean_stddev};

pub const NAME: &str = "artefactos";
pub const VERSION: &str = "2.1.0";

/// Per-image luminance statistics feeding the heuristic flags.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactStats {
    pub mean: f64,
    pub stddev: f64,
    /// Average 2-D gradient magnitude, `(|dx| + |dy|) / 2` per pixel.
    pub gradient: f64,
    /// Shannon entropy in bits (0..=8).
    pub entropy_bits: f64,
    /// Local maxima in the 256-bin luminance histogram.
    pub histogram_peaks: usize,
    /// Mean absolute difference across 8x8 block boundaries.
    pub blockiness: f64,
    /// |mean(upper half) - mean(lower half)|.
    pub half_mean_gap: f64,
    /// Edge-density ratio between left and right halves (max/min).
    pub edge_asymmetry: f64,
}

/// Heuristic anomaly flags. Each flag contributes its weight to the score
/// only when absent, so the score rewards the absence of anomalies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactFlags {
    pub excessive_smoothness: bool,
    pub gan_signature: bool,
    pub checkerboard: bool,
    pub inconsistent_edges: bool,
    pub inconsistent_luminance: bool,
    pub extreme_contrast: bool,
    pub moderate_blockiness: bool,
    pub high_blockiness: bool,
}

const FLAG_WEIGHTS: [f64; 8] = [0.18, 0.16, 0.14, 0.12, 0.12, 0.08, 0.10, 0.10];

pub fn analyze_artifacts(
    image: &ImageData,
    _config: &AnalysisConfig,
    cancel: &CancelToken,
) -> AnalyzerResult {
    let started = Instant::now();

    let lum = image.luminance();
    if lum.is_empty() || image.width < 2 || image.height < 2 {
        let mut failed = AnalyzerResult::failure(
            NAME,
            VERSION,
            "imagen indeterminable: luminancia no disponible",
        );
        failed.duration_ms = started.elapsed().as_millis() as u64;
        return failed;
    }

    let stats = match compute_stats(&lum, image.width, image.height, cancel) {
        Some(s) => s,
        None => {
            let mut failed =
                AnalyzerResult::failure(NAME, VERSION, "análisis cancelado por tiempo");
            failed.duration_ms = started.elapsed().as_millis() as u64;
            return failed;
        }
    };

    let flags = derive_flags(&stats);
    let score = score_from_flags(&flags);
    let vector = feature_vector(image, &stats, score);

    let mut result = AnalyzerResult::new(NAME, VERSION);
    result.score = Some(score);
    result.confidence = Confidence::High;
    result.feature_vector = Some(vector);

    result.details.insert("blockiness".into(), stats.blockiness.into());
    result
        .details
        .insert("entropiaBits".into(), stats.entropy_bits.into());
    result
        .details
        .insert("gradienteMedio".into(), stats.gradient.into());
    result.details.insert(
        "picosHistograma".into(),
        (stats.histogram_peaks as f64).into(),
    );
    result
        .details
        .insert("suavidadExcesiva".into(), flags.excessive_smoothness.into());
    result
        .details
        .insert("firmaGan".into(), flags.gan_signature.into());
    result
        .details
        .insert("tableroAjedrez".into(), flags.checkerboard.into());
    result
        .details
        .insert("bordesInconsistentes".into(), flags.inconsistent_edges.into());
    result.details.insert(
        "luminanciaInconsistente".into(),
        flags.inconsistent_luminance.into(),
    );
    result
        .details
        .insert("contrasteExtremo".into(), flags.extreme_contrast.into());
    result.metadata.insert("mediaLuminancia".into(), stats.mean.into());
    result.metadata.insert("desviacion".into(), stats.stddev.into());
    result.duration_ms = started.elapsed().as_millis() as u64;
    result
}

fn compute_stats(
    lum: &[u8],
    width: usize,
    height: usize,
    cancel: &CancelToken,
) -> Option<ArtifactStats> {
    let (mean, stddev) = mean_stddev(lum);
    let entropy_bits = histogram_entropy(lum) * 8.0;
    let peaks = histogram_peaks(lum);

    // Average 2-D gradient and per-half edge densities in one pass
    let mut grad_sum = 0.0;
    let mut grad_count = 0u64;
    let mut left_edges = 0u64;
    let mut right_edges = 0u64;
    let mut left_count = 0u64;
    let mut right_count = 0u64;
    for y in 0..height - 1 {
        if cancel.is_cancelled() {
            return None;
        }
        for x in 0..width - 1 {
            let p = lum[y * width + x] as f64;
            let dx = (lum[y * width + x + 1] as f64 - p).abs();
            let dy = (lum[(y + 1) * width + x] as f64 - p).abs();
            grad_sum += (dx + dy) / 2.0;
            grad_count += 1;

            let is_edge = dx > 30.0;
            if x < width / 2 {
                left_count += 1;
                if is_edge {
                    left_edges += 1;
                }
            } else {
                right_count += 1;
                if is_edge {
                    right_edges += 1;
                }
            }
        }
    }
    let gradient = if grad_count > 0 {
        grad_sum / grad_count as f64
    } else {
        0.0
    };

    let left_density = left_edges as f64 / left_count.max(1) as f64;
    let right_density = right_edges as f64 / right_count.max(1) as f64;
    let lo = left_density.min(right_density);
    let hi = left_density.max(right_density);
    let edge_asymmetry = if lo > 1e-6 { hi / lo } else if hi > 0.05 { 10.0 } else { 1.0 };

    let blockiness = block_boundary_energy(lum, width, height, cancel)?;

    // Upper vs lower half mean luminance
    let half = height / 2;
    let upper = &lum[..half * width];
    let lower = &lum[half * width..];
    let half_mean_gap = (crate::core::signal::mean(upper) - crate::core::signal::mean(lower)).abs();

    Some(ArtifactStats {
        mean,
        stddev,
        gradient,
        entropy_bits,
        histogram_peaks: peaks,
        blockiness,
        half_mean_gap,
        edge_asymmetry,
    })
}

/// Mean absolute luminance difference across 8x8 block boundaries.
/// A JPEG-recompression signature: block-coded images show elevated
/// discontinuity exactly at grid lines.
fn block_boundary_energy(
    lum: &[u8],
    width: usize,
    height: usize,
    cancel: &CancelToken,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0u64;

    // Vertical boundaries (columns at multiples of 8)
    for x in (8..width).step_by(8) {
        if cancel.is_cancelled() {
            return None;
        }
        for y in 0..height {
            let a = lum[y * width + x - 1] as f64;
            let b = lum[y * width + x] as f64;
            sum += (a - b).abs();
            count += 1;
        }
    }

    // Horizontal boundaries (rows at multiples of 8)
    for y in (8..height).step_by(8) {
        if cancel.is_cancelled() {
            return None;
        }
        for x in 0..width {
            let a = lum[(y - 1) * width + x] as f64;
            let b = lum[y * width + x] as f64;
            sum += (a - b).abs();
            count += 1;
        }
    }

    if count == 0 {
        return Some(0.0);
    }
    Some(sum / count as f64)
}

fn derive_flags(stats: &ArtifactStats) -> ArtifactFlags {
    ArtifactFlags {
        excessive_smoothness: stats.gradient < 10.0
            && stats.entropy_bits > 7.2
            && stats.stddev > 55.0,
        gan_signature: stats.gradient < 11.0
            && (10..=60).contains(&stats.histogram_peaks)
            && stats.entropy_bits > 7.1,
        checkerboard: stats.histogram_peaks < 8
            && stats.blockiness < 10.0
            && stats.entropy_bits > 6.85,
        inconsistent_edges: stats.edge_asymmetry > 3.0,
        inconsistent_luminance: stats.half_mean_gap > 28.0,
        extreme_contrast: stats.stddev > 85.0,
        moderate_blockiness: stats.blockiness > 10.0,
        high_blockiness: stats.blockiness > 12.0,
    }
}

fn score_from_flags(flags: &ArtifactFlags) -> f64 {
    let present = [
        flags.excessive_smoothness,
        flags.gan_signature,
        flags.checkerboard,
        flags.inconsistent_edges,
        flags.inconsistent_luminance,
        flags.extreme_contrast,
        flags.moderate_blockiness,
        flags.high_blockiness,
    ];

    let natural: f64 = present
        .iter()
        .zip(FLAG_WEIGHTS)
        .filter(|(&flag, _)| !flag)
        .map(|(_, w)| w)
        .sum();

    clamp_score(natural * 10.0)
}

/// The 10-element feature vector. Element order and ranges are a stable
/// public contract versioned with `VERSION` — do not reorder.
///
/// 0: width / 4000        1: height / 4000
/// 2: pixel count / 12M   3: aspect ratio (max/min) / 3
/// 4: normalized entropy  5: entropy complement
/// 6: gradient / 50       7: blockiness / 25
/// 8: stddev / 128        9: inverted score (1 - score/10)
fn feature_vector(image: &ImageData, stats: &ArtifactStats, score: f64) -> [f64; 10] {
    let w = image.width as f64;
    let h = image.height as f64;
    let aspect = w.max(h) / w.min(h).max(1.0);
    let entropy_norm = stats.entropy_bits / 8.0;

    [
        clamp01(w / 4000.0),
        clamp01(h / 4000.0),
        clamp01(w * h / 12_000_000.0),
        clamp01(aspect / 3.0),
        clamp01(entropy_norm),
        clamp01(1.0 - entropy_norm),
        clamp01(stats.gradient / 50.0),
        clamp01(stats.blockiness / 25.0),
        clamp01(stats.stddev / 128.0),
        clamp01(1.0 - score / 10.0),
    ]
}
