//! Analyzer result types
//!
//! Every analyzer returns the same tagged `AnalyzerResult` schema; the
//! forensic suite additionally produces a `CompositeAuthenticityResult`.
//! Spanish wire field names (`scoreAutenticidad`, `esAutentico`,
//! `nivelConfianza`) are the deployed JSON contract and are preserved via
//! serde renames.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confidence attached to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Error,
}

impl Confidence {
    /// Numeric weight used when averaging confidences in the aggregator.
    pub fn weight(self) -> f64 {
        match self {
            Confidence::High => 1.0,
            Confidence::Medium => 0.7,
            Confidence::Low => 0.4,
            Confidence::Error => 0.0,
        }
    }
}

/// A single detail or metric value attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl From<&str> for DetailValue {
    fn from(s: &str) -> Self {
        DetailValue::Text(s.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(s: String) -> Self {
        DetailValue::Text(s)
    }
}

impl From<f64> for DetailValue {
    fn from(n: f64) -> Self {
        DetailValue::Number(n)
    }
}

impl From<bool> for DetailValue {
    fn from(b: bool) -> Self {
        DetailValue::Flag(b)
    }
}

/// Self-contained result record produced by one analyzer.
///
/// `score = None` means the analyzer could not produce a judgement (corrupt
/// input, cancellation) — distinct from a low score, which is a judgement of
/// likely synthetic origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerResult {
    pub name: String,
    pub version: String,
    /// Authenticity score in [0, 10], or `None` when indeterminable.
    pub score: Option<f64>,
    pub confidence: Confidence,
    pub details: BTreeMap<String, DetailValue>,
    pub metadata: BTreeMap<String, DetailValue>,
    /// Fixed-length normalized feature vector for downstream classifiers.
    /// Element order is a stable contract versioned with `version`.
    #[serde(rename = "featureVector")]
    pub feature_vector: Option<[f64; 10]>,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
}

impl AnalyzerResult {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            score: None,
            confidence: Confidence::Low,
            details: BTreeMap::new(),
            metadata: BTreeMap::new(),
            feature_vector: None,
            duration_ms: 0,
        }
    }

    /// Unrecoverable failure: null score, error confidence, and a
    /// human-readable message under `detalles.mensaje`.
    pub fn failure(name: &str, version: &str, mensaje: impl Into<String>) -> Self {
        let mut result = Self::new(name, version);
        result.confidence = Confidence::Error;
        result
            .details
            .insert("mensaje".to_string(), DetailValue::Text(mensaje.into()));
        result
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<DetailValue>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Identifies one of the seven forensic probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Ela,
    Compression,
    Exif,
    Noise,
    Color,
    Edges,
    Frequency,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 7] = [
        ProbeKind::Ela,
        ProbeKind::Compression,
        ProbeKind::Exif,
        ProbeKind::Noise,
        ProbeKind::Color,
        ProbeKind::Edges,
        ProbeKind::Frequency,
    ];

    /// Aggregation weight. The seven weights sum to exactly 1.0.
    pub fn weight(self) -> f64 {
        match self {
            ProbeKind::Ela => 0.22,
            ProbeKind::Compression => 0.18,
            ProbeKind::Exif => 0.13,
            ProbeKind::Noise => 0.18,
            ProbeKind::Color => 0.10,
            ProbeKind::Edges => 0.10,
            ProbeKind::Frequency => 0.09,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProbeKind::Ela => "ela",
            ProbeKind::Compression => "compression",
            ProbeKind::Exif => "exif",
            ProbeKind::Noise => "noise",
            ProbeKind::Color => "color",
            ProbeKind::Edges => "edges",
            ProbeKind::Frequency => "frequency",
        }
    }
}

/// Result of a single forensic probe. Ephemeral: consumed by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForensicProbeResult {
    pub probe: ProbeKind,
    /// Probe authenticity score in [0, 1]; `None` when the probe errored and
    /// must be excluded from the weighted mean.
    pub score: Option<f64>,
    pub confidence: Confidence,
    #[serde(rename = "rawMetrics")]
    pub raw_metrics: BTreeMap<String, DetailValue>,
}

impl ForensicProbeResult {
    pub fn new(probe: ProbeKind, score: f64, confidence: Confidence) -> Self {
        Self {
            probe,
            score: Some(crate::core::signal::clamp01(score)),
            confidence,
            raw_metrics: BTreeMap::new(),
        }
    }

    pub fn errored(probe: ProbeKind, mensaje: impl Into<String>) -> Self {
        let mut result = Self {
            probe,
            score: None,
            confidence: Confidence::Error,
            raw_metrics: BTreeMap::new(),
        };
        result
            .raw_metrics
            .insert("mensaje".to_string(), DetailValue::Text(mensaje.into()));
        result
    }

    pub fn with_metric(mut self, key: &str, value: impl Into<DetailValue>) -> Self {
        self.raw_metrics.insert(key.to_string(), value.into());
        self
    }
}

/// Qualitative confidence label on the composite verdict.
/// Serialized as the Spanish contract strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    #[serde(rename = "alta")]
    Alta,
    #[serde(rename = "media")]
    Media,
    #[serde(rename = "baja")]
    Baja,
}

/// Weighted authenticity verdict over the forensic probes.
/// Recomputed fresh on every request, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeAuthenticityResult {
    #[serde(rename = "scoreAutenticidad")]
    pub score_autenticidad: f64,
    #[serde(rename = "esAutentico")]
    pub es_autentico: bool,
    #[serde(rename = "nivelConfianza")]
    pub nivel_confianza: ConfidenceLabel,
    #[serde(rename = "perProbe")]
    pub per_probe: Vec<ForensicProbeResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_weights_sum_to_one() {
        let sum: f64 = ProbeKind::ALL.iter().map(|p| p.weight()).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_probe_score_is_clamped() {
        let probe = ForensicProbeResult::new(ProbeKind::Color, 1.7, Confidence::Medium);
        assert_eq!(probe.score, Some(1.0));
    }

    #[test]
    fn test_failure_carries_mensaje() {
        let result = AnalyzerResult::failure("texture", "1.0.0", "archivo no encontrado");
        assert_eq!(result.score, None);
        assert_eq!(result.confidence, Confidence::Error);
        assert_eq!(
            result.details.get("mensaje"),
            Some(&DetailValue::Text("archivo no encontrado".to_string()))
        );
    }

    #[test]
    fn test_confidence_label_serializes_spanish() {
        let json = serde_json::to_string(&ConfidenceLabel::Alta).unwrap();
        assert_eq!(json, "\"alta\"");
    }
}
