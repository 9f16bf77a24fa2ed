// src/core/analysis/forensics/mod.rs
//
// Forensic authenticity suite: seven independent probes over the same
// decoded image, aggregated into one weighted authenticity verdict.

mod color;
mod compression;
mod edges;
mod ela;
mod exif_check;
mod frequency;
mod noise;

use log::debug;
use rayon::prelude::*;
use std::time::Instant;

use crate::core::cancel::CancelToken;
use crate::core::config::AnalysisConfig;
use crate::core::decoder::ImageData;
use crate::core::result::{
    AnalyzerResult, Confidence, ConfidenceLabel, CompositeAuthenticityResult,
    ForensicProbeResult, ProbeKind,
};
use crate::core::signal::clamp01;

pub const NAME: &str = "forense";
pub const VERSION: &str = "2.4.0";

/// Composite score at or above this is ruled authentic.
const AUTHENTIC_THRESHOLD: f64 = 0.6;

/// Run the seven probes in parallel and aggregate the verdict.
///
/// Probes that error are excluded from the weighted mean (their weight is
/// redistributed by renormalizing over the probes that did report), never
/// treated as score zero.
pub fn run_forensic_suite(
    image: &ImageData,
    config: &AnalysisConfig,
    cancel: &CancelToken,
) -> (AnalyzerResult, CompositeAuthenticityResult) {
    let started = Instant::now();

    let probes: Vec<ForensicProbeResult> = ProbeKind::ALL
        .par_iter()
        .map(|&kind| run_probe(kind, image, config, cancel))
        .collect();

    for probe in &probes {
        debug!(
            "probe {} -> score={:?} confidence={:?}",
            probe.probe.name(),
            probe.score,
            probe.confidence
        );
    }

    let composite = aggregate(probes);

    let mut result = AnalyzerResult::new(NAME, VERSION);
    let reporting = composite.per_probe.iter().filter(|p| p.score.is_some()).count();
    if reporting == 0 {
        result = AnalyzerResult::failure(NAME, VERSION, "todas las sondas forenses fallaron");
    } else {
        result.score = Some(composite.score_autenticidad * 10.0);
        result.confidence = match composite.nivel_confianza {
            ConfidenceLabel::Alta => Confidence::High,
            ConfidenceLabel::Media => Confidence::Medium,
            ConfidenceLabel::Baja => Confidence::Low,
        };
        result.details.insert(
            "scoreAutenticidad".into(),
            composite.score_autenticidad.into(),
        );
        result
            .details
            .insert("esAutentico".into(), composite.es_autentico.into());
        result
            .details
            .insert("sondasReportando".into(), (reporting as f64).into());
    }
    result.duration_ms = started.elapsed().as_millis() as u64;

    (result, composite)
}

fn run_probe(
    kind: ProbeKind,
    image: &ImageData,
    config: &AnalysisConfig,
    cancel: &CancelToken,
) -> ForensicProbeResult {
    match kind {
        ProbeKind::Ela => ela::run(image, config, cancel),
        ProbeKind::Compression => compression::run(image, config, cancel),
        ProbeKind::Exif => exif_check::run(image, config, cancel),
        ProbeKind::Noise => noise::run(image, config, cancel),
        ProbeKind::Color => color::run(image, config, cancel),
        ProbeKind::Edges => edges::run(image, config, cancel),
        ProbeKind::Frequency => frequency::run(image, config, cancel),
    }
}

/// Weighted mean over probes that reported a score, plus the qualitative
/// confidence label.
pub fn aggregate(probes: Vec<ForensicProbeResult>) -> CompositeAuthenticityResult {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for probe in &probes {
        if let Some(score) = probe.score {
            weighted_sum += probe.probe.weight() * score;
            weight_total += probe.probe.weight();
        }
    }

    let score_autenticidad = if weight_total > 0.0 {
        clamp01(weighted_sum / weight_total)
    } else {
        // Nothing reported: neutral, flagged baja below
        0.5
    };

    let mean_confidence = if probes.is_empty() {
        0.0
    } else {
        probes.iter().map(|p| p.confidence.weight()).sum::<f64>() / probes.len() as f64
    };

    let nivel_confianza = if weight_total == 0.0 {
        ConfidenceLabel::Baja
    } else if mean_confidence >= 0.8 && score_autenticidad >= 0.75 {
        ConfidenceLabel::Alta
    } else if mean_confidence >= 0.6 && score_autenticidad >= 0.5 {
        ConfidenceLabel::Media
    } else {
        ConfidenceLabel::Baja
    };

    CompositeAuthenticityResult {
        score_autenticidad,
        es_autentico: score_autenticidad >= AUTHENTIC_THRESHOLD,
        nivel_confianza,
        per_probe: probes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testgen;

    fn probe(kind: ProbeKind, score: f64, confidence: Confidence) -> ForensicProbeResult {
        ForensicProbeResult::new(kind, score, confidence)
    }

    #[test]
    fn test_composite_between_min_and_max() {
        let probes = vec![
            probe(ProbeKind::Ela, 0.9, Confidence::High),
            probe(ProbeKind::Compression, 0.4, Confidence::Medium),
            probe(ProbeKind::Noise, 0.7, Confidence::Medium),
        ];
        let composite = aggregate(probes);
        assert!(composite.score_autenticidad >= 0.4);
        assert!(composite.score_autenticidad <= 0.9);
    }

    #[test]
    fn test_errored_probe_excluded_not_zeroed() {
        let with_error = vec![
            probe(ProbeKind::Ela, 0.8, Confidence::High),
            ForensicProbeResult::errored(ProbeKind::Exif, "sin metadatos"),
        ];
        let composite = aggregate(with_error);
        // Only ELA contributes: composite equals its score, not a mean with 0
        assert!((composite.score_autenticidad - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_all_errored_is_neutral_baja() {
        let probes = vec![
            ForensicProbeResult::errored(ProbeKind::Ela, "x"),
            ForensicProbeResult::errored(ProbeKind::Noise, "y"),
        ];
        let composite = aggregate(probes);
        assert_eq!(composite.score_autenticidad, 0.5);
        assert_eq!(composite.nivel_confianza, ConfidenceLabel::Baja);
        assert!(!composite.es_autentico);
    }

    #[test]
    fn test_confidence_labels() {
        let alta = aggregate(vec![
            probe(ProbeKind::Ela, 0.9, Confidence::High),
            probe(ProbeKind::Noise, 0.85, Confidence::High),
        ]);
        assert_eq!(alta.nivel_confianza, ConfidenceLabel::Alta);

        let baja = aggregate(vec![
            probe(ProbeKind::Ela, 0.2, Confidence::Low),
            probe(ProbeKind::Noise, 0.3, Confidence::Low),
        ]);
        assert_eq!(baja.nivel_confianza, ConfidenceLabel::Baja);
    }

    #[test]
    fn test_authentic_threshold() {
        let yes = aggregate(vec![probe(ProbeKind::Ela, 0.65, Confidence::High)]);
        assert!(yes.es_autentico);
        let no = aggregate(vec![probe(ProbeKind::Ela, 0.55, Confidence::High)]);
        assert!(!no.es_autentico);
    }

    #[test]
    fn test_suite_runs_all_probes() {
        let image = testgen::uniform_gray(128, 128, 128);
        let (result, composite) =
            run_forensic_suite(&image, &AnalysisConfig::default(), &CancelToken::none());
        assert_eq!(composite.per_probe.len(), 7);
        assert!(result.score.is_some());
    }
}
