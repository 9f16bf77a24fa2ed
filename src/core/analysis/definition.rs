// src/core/analysis/definition.rs
//
// Definition/sharpness analyzer: vertical-gradient sharpness, tonal
// variability and entropy-based complexity combined into one score.

use std::time::Instant;

use crate::core::cancel::CancelToken;
use crate::core::config::AnalysisConfig;
use crate::core::decoder::ImageData;
use crate::core::result::{AnalyzerResult, Confidence};
use crate::core::signal::{clamp01, clamp_score, histogram_entropy, mean_stddev};

pub const NAME: &str = "definicion";
pub const VERSION: &str = "1.3.0";

const WEIGHT_NITIDEZ: f64 = 0.50;
const WEIGHT_VARIABILIDAD: f64 = 0.30;
const WEIGHT_COMPLEJIDAD: f64 = 0.20;

/// The three sub-scores, each already mapped to [0, 1].
#[derive(Debug, Clone, Copy)]
struct DefinitionBreakdown {
    nitidez: f64,
    variabilidad: f64,
    complejidad: f64,
    raw_gradient: f64,
}

/// Analyze image definition/sharpness.
///
/// Images with width or height <= 1 short-circuit to score 0 with an
/// explicit indeterminate detail.
pub fn analyze_definition(
    image: &ImageData,
    _config: &AnalysisConfig,
    cancel: &CancelToken,
) -> AnalyzerResult {
    let started = Instant::now();
    let mut result = AnalyzerResult::new(NAME, VERSION);

    if image.width <= 1 || image.height <= 1 {
        result.score = Some(0.0);
        result.confidence = Confidence::Low;
        result = result.with_detail(
            "mensaje",
            "Dimensiones insuficientes para evaluar la definición",
        );
        result.duration_ms = started.elapsed().as_millis() as u64;
        return result;
    }

    let lum = image.luminance();
    if lum.is_empty() {
        let mut failed =
            AnalyzerResult::failure(NAME, VERSION, "no se pudo obtener el canal de luminancia");
        failed.duration_ms = started.elapsed().as_millis() as u64;
        return failed;
    }

    let breakdown = match compute_breakdown(&lum, image.width, image.height, cancel) {
        Some(b) => b,
        None => {
            let mut failed =
                AnalyzerResult::failure(NAME, VERSION, "análisis cancelado por tiempo");
            failed.duration_ms = started.elapsed().as_millis() as u64;
            return failed;
        }
    };

    let composite = WEIGHT_NITIDEZ * breakdown.nitidez
        + WEIGHT_VARIABILIDAD * breakdown.variabilidad
        + WEIGHT_COMPLEJIDAD * breakdown.complejidad;
    let score = clamp_score(composite * 10.0);

    result.score = Some(score);
    result.confidence = Confidence::High;
    result.details.insert("nitidez".into(), breakdown.nitidez.into());
    result
        .details
        .insert("variabilidad".into(), breakdown.variabilidad.into());
    result
        .details
        .insert("complejidad".into(), breakdown.complejidad.into());
    result
        .details
        .insert("evaluacionScore".into(), score_band(score).into());
    result
        .metadata
        .insert("gradienteMedio".into(), breakdown.raw_gradient.into());
    result.duration_ms = started.elapsed().as_millis() as u64;
    result
}

fn compute_breakdown(
    lum: &[u8],
    width: usize,
    height: usize,
    cancel: &CancelToken,
) -> Option<DefinitionBreakdown> {
    // Mean absolute vertical pixel-to-pixel gradient
    let mut grad_sum = 0.0;
    let mut grad_count = 0u64;
    for y in 0..height - 1 {
        if cancel.is_cancelled() {
            return None;
        }
        for x in 0..width {
            let a = lum[y * width + x] as f64;
            let b = lum[(y + 1) * width + x] as f64;
            grad_sum += (a - b).abs();
            grad_count += 1;
        }
    }
    let raw_gradient = if grad_count > 0 {
        grad_sum / grad_count as f64
    } else {
        0.0
    };

    // Gradient below 8 reads as natural softness, above 15 as artificial
    // over-sharpening; linear in between.
    let nitidez = if raw_gradient < 8.0 {
        0.9
    } else if raw_gradient > 15.0 {
        0.1
    } else {
        0.9 - (raw_gradient - 8.0) * (0.8 / 7.0)
    };

    let (_, stddev) = mean_stddev(lum);
    let variabilidad = 1.0 - clamp01(stddev / 128.0);

    // Gaussian bump rewards mid-range entropy; near-uniform and near-random
    // images both score low.
    let entropy = histogram_entropy(lum);
    let complejidad = (-15.0 * (entropy - 0.6) * (entropy - 0.6)).exp();

    Some(DefinitionBreakdown {
        nitidez: clamp01(nitidez),
        variabilidad: clamp01(variabilidad),
        complejidad: clamp01(complejidad),
        raw_gradient,
    })
}

fn score_band(score: f64) -> &'static str {
    if score >= 8.0 {
        "excelente"
    } else if score >= 6.0 {
        "buena"
    } else if score >= 4.0 {
        "media"
    } else if score >= 2.0 {
        "baja"
    } else {
        "muy baja"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testgen;

    #[test]
    fn test_tiny_image_short_circuits() {
        let image = testgen::uniform_gray(1, 1, 128);
        let result = analyze_definition(&image, &AnalysisConfig::default(), &CancelToken::none());
        assert_eq!(result.score, Some(0.0));
        let mensaje = result.details.get("mensaje").unwrap();
        match mensaje {
            crate::core::result::DetailValue::Text(t) => {
                assert!(t.starts_with("Dimensiones insuficientes"))
            }
            other => panic!("expected text detail, got {:?}", other),
        }
    }

    #[test]
    fn test_flat_image_scores_soft_and_uniform() {
        let image = testgen::uniform_gray(64, 64, 128);
        let result = analyze_definition(&image, &AnalysisConfig::default(), &CancelToken::none());
        let score = result.score.unwrap();
        // nitidez 0.9, variabilidad 1.0, complejidad ~0 for zero entropy
        let expected = (0.5 * 0.9 + 0.3 * 1.0 + 0.2 * (-15.0f64 * 0.36).exp()) * 10.0;
        assert!((score - expected).abs() < 0.05);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(score_band(9.0), "excelente");
        assert_eq!(score_band(6.5), "buena");
        assert_eq!(score_band(4.2), "media");
        assert_eq!(score_band(3.0), "baja");
        assert_eq!(score_band(0.5), "muy baja");
    }

    #[test]
    fn test_cancelled_returns_error() {
        let image = testgen::uniform_gray(64, 64, 128);
        let token = CancelToken::none();
        token.cancel();
        let result = analyze_definition(&image, &AnalysisConfig::default(), &token);
        assert_eq!(result.score, None);
        assert_eq!(result.confidence, Confidence::Error);
    }
}
