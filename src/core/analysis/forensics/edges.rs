// src/core/analysis/forensics/edges.rs
//
// Edge-anomaly probe: a 3x3 high-pass convolution over the luminance plane.
// Compositing and over-sharpened generations leave an excess of strong
// high-frequency responses; softer natural edges score higher.

use crate::core::cancel::CancelToken;
use crate::core::config::AnalysisConfig;
use crate::core::decoder::ImageData;
use crate::core::result::{Confidence, ForensicProbeResult, ProbeKind};
use crate::core::signal::clamp01;

/// High-pass kernel: 8x center minus the 8-neighborhood.
const KERNEL: [f64; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];
/// Absolute response above this counts as a strong edge.
const EDGE_THRESHOLD: f64 = 50.0;

pub fn run(
    image: &ImageData,
    _config: &AnalysisConfig,
    cancel: &CancelToken,
) -> ForensicProbeResult {
    let lum = image.luminance();
    if lum.is_empty() || image.width < 3 || image.height < 3 {
        return ForensicProbeResult::errored(
            ProbeKind::Edges,
            "imagen demasiado pequeña para análisis de bordes",
        );
    }

    let width = image.width;
    let height = image.height;
    let mut strong = 0u64;
    let mut total = 0u64;

    for y in 1..height - 1 {
        if cancel.is_cancelled() {
            return ForensicProbeResult::errored(ProbeKind::Edges, "análisis cancelado por tiempo");
        }
        for x in 1..width - 1 {
            let mut response = 0.0;
            let mut k = 0;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let xi = (x as i32 + dx) as usize;
                    let yi = (y as i32 + dy) as usize;
                    response += KERNEL[k] * lum[yi * width + xi] as f64;
                    k += 1;
                }
            }
            if response.abs() > EDGE_THRESHOLD {
                strong += 1;
            }
            total += 1;
        }
    }

    if total == 0 {
        return ForensicProbeResult::errored(ProbeKind::Edges, "sin píxeles interiores");
    }

    let edge_ratio = strong as f64 / total as f64;
    let score = clamp01(1.0 - edge_ratio * 4.0);

    ForensicProbeResult::new(ProbeKind::Edges, score, Confidence::Medium)
        .with_metric("ratioBordes", edge_ratio)
        .with_metric("bordesFuertes", strong as f64)
}
