// src/core/analyzer.rs
//
// High-level image analysis API with builder pattern. Owns the decoded
// pixel buffer for the request lifetime and dispatches the analyzer
// families in parallel.

use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::analysis::{
    analyze_artifacts, analyze_definition, analyze_texture, forensics::run_forensic_suite,
    ARTIFACTS_NAME, ARTIFACTS_VERSION, DEFINITION_NAME, DEFINITION_VERSION, FORENSICS_NAME,
    FORENSICS_VERSION, TEXTURE_NAME, TEXTURE_VERSION,
};
use super::cancel::CancelToken;
use super::config::AnalysisConfig;
use super::decoder::{decode_image, decode_image_bytes, ImageData};
use super::result::{AnalyzerResult, CompositeAuthenticityResult, ConfidenceLabel};

/// Where the image bytes come from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// One analysis invocation. Immutable; discarded after the report is built.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub source: ImageSource,
    pub correlation_id: String,
    pub image_id: String,
    pub config: AnalysisConfig,
}

impl AnalysisRequest {
    pub fn from_path(path: impl Into<PathBuf>, config: AnalysisConfig) -> Self {
        Self {
            source: ImageSource::Path(path.into()),
            correlation_id: Uuid::new_v4().to_string(),
            image_id: Uuid::new_v4().to_string(),
            config,
        }
    }

    pub fn from_bytes(bytes: Vec<u8>, config: AnalysisConfig) -> Self {
        Self {
            source: ImageSource::Bytes(bytes),
            correlation_id: Uuid::new_v4().to_string(),
            image_id: Uuid::new_v4().to_string(),
            config,
        }
    }
}

/// Complete analysis report: one result per analyzer family plus the
/// forensic composite verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
    #[serde(rename = "imagenId")]
    pub image_id: String,
    pub texture: AnalyzerResult,
    pub definition: AnalyzerResult,
    pub artifacts: AnalyzerResult,
    pub forensics: AnalyzerResult,
    pub composite: CompositeAuthenticityResult,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
}

impl AnalysisReport {
    /// Report for an image that could not be decoded: every analyzer
    /// reports a null score with error confidence.
    fn decode_failure(request: &AnalysisRequest, mensaje: &str) -> Self {
        Self {
            correlation_id: request.correlation_id.clone(),
            image_id: request.image_id.clone(),
            texture: AnalyzerResult::failure(TEXTURE_NAME, TEXTURE_VERSION, mensaje),
            definition: AnalyzerResult::failure(DEFINITION_NAME, DEFINITION_VERSION, mensaje),
            artifacts: AnalyzerResult::failure(ARTIFACTS_NAME, ARTIFACTS_VERSION, mensaje),
            forensics: AnalyzerResult::failure(FORENSICS_NAME, FORENSICS_VERSION, mensaje),
            composite: CompositeAuthenticityResult {
                score_autenticidad: 0.5,
                es_autentico: false,
                nivel_confianza: ConfidenceLabel::Baja,
                per_probe: Vec::new(),
            },
            duration_ms: 0,
        }
    }
}

/// Builder for `ImageAnalyzer` configuration.
pub struct AnalyzerBuilder {
    config: AnalysisConfig,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn check_texture(mut self, check: bool) -> Self {
        self.config.check_texture = check;
        self
    }

    pub fn check_definition(mut self, check: bool) -> Self {
        self.config.check_definition = check;
        self
    }

    pub fn check_artifacts(mut self, check: bool) -> Self {
        self.config.check_artifacts = check;
        self
    }

    pub fn check_forensics(mut self, check: bool) -> Self {
        self.config.check_forensics = check;
        self
    }

    pub fn build<P: AsRef<Path>>(self, path: P) -> Result<ImageAnalyzer> {
        let image = decode_image(path.as_ref())?;
        Ok(ImageAnalyzer {
            path: Some(path.as_ref().to_path_buf()),
            image,
            config: self.config,
        })
    }

    pub fn build_from_bytes(self, bytes: &[u8]) -> Result<ImageAnalyzer> {
        let image = decode_image_bytes(bytes)?;
        Ok(ImageAnalyzer {
            path: None,
            image,
            config: self.config,
        })
    }
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main image analyzer with fluent API.
pub struct ImageAnalyzer {
    path: Option<PathBuf>,
    image: ImageData,
    config: AnalysisConfig,
}

impl ImageAnalyzer {
    /// Create an analyzer with default configuration.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        AnalyzerBuilder::new().build(path)
    }

    /// Create an analyzer over an in-memory buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        AnalyzerBuilder::new().build_from_bytes(bytes)
    }

    pub fn with_config<P: AsRef<Path>>(path: P, config: AnalysisConfig) -> Result<Self> {
        let image = decode_image(path.as_ref())?;
        Ok(Self {
            path: Some(path.as_ref().to_path_buf()),
            image,
            config,
        })
    }

    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Run the full analysis battery.
    pub fn analyze(&self) -> AnalysisReport {
        let request = AnalysisRequest {
            source: match &self.path {
                Some(p) => ImageSource::Path(p.clone()),
                None => ImageSource::Bytes(Vec::new()),
            },
            correlation_id: Uuid::new_v4().to_string(),
            image_id: Uuid::new_v4().to_string(),
            config: self.config.clone(),
        };
        analyze_image(&self.image, &request)
    }

    pub fn image_data(&self) -> &ImageData {
        &self.image
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Decode and analyze one request end to end.
///
/// Never returns an error: an undecodable source degrades to a report where
/// every analyzer carries a null score and error confidence.
pub fn analyze_request(request: &AnalysisRequest) -> AnalysisReport {
    let decoded = match &request.source {
        ImageSource::Path(path) => decode_image(path),
        ImageSource::Bytes(bytes) => decode_image_bytes(bytes),
    };

    match decoded {
        Ok(image) => analyze_image(&image, request),
        Err(e) => {
            warn!(
                "correlation={} decode failed: {e:#}",
                request.correlation_id
            );
            AnalysisReport::decode_failure(request, &format!("imagen indeterminable: {e}"))
        }
    }
}

/// Run the four analyzer families over an already-decoded image.
///
/// The families are independent and stateless, so they run as parallel
/// tasks joined before the report is assembled.
pub fn analyze_image(image: &ImageData, request: &AnalysisRequest) -> AnalysisReport {
    let started = Instant::now();
    let config = &request.config;
    let cancel = match config.timeout_ms {
        Some(ms) => CancelToken::with_deadline(Duration::from_millis(ms)),
        None => CancelToken::none(),
    };

    debug!(
        "correlation={} analyzing {}x{} ({})",
        request.correlation_id, image.width, image.height, image.format_name
    );

    let ((texture, definition), (artifacts, forensic_pair)) = rayon::join(
        || {
            rayon::join(
                || {
                    if config.check_texture {
                        analyze_texture(image, config, &cancel)
                    } else {
                        disabled(TEXTURE_NAME, TEXTURE_VERSION)
                    }
                },
                || {
                    if config.check_definition {
                        analyze_definition(image, config, &cancel)
                    } else {
                        disabled(DEFINITION_NAME, DEFINITION_VERSION)
                    }
                },
            )
        },
        || {
            rayon::join(
                || {
                    if config.check_artifacts {
                        analyze_artifacts(image, config, &cancel)
                    } else {
                        disabled(ARTIFACTS_NAME, ARTIFACTS_VERSION)
                    }
                },
                || {
                    if config.check_forensics {
                        run_forensic_suite(image, config, &cancel)
                    } else {
                        (
                            disabled(FORENSICS_NAME, FORENSICS_VERSION),
                            CompositeAuthenticityResult {
                                score_autenticidad: 0.5,
                                es_autentico: false,
                                nivel_confianza: ConfidenceLabel::Baja,
                                per_probe: Vec::new(),
                            },
                        )
                    }
                },
            )
        },
    );

    let (forensics, composite) = forensic_pair;
    let duration_ms = started.elapsed().as_millis() as u64;
    debug!(
        "correlation={} done in {}ms (composite={:.3})",
        request.correlation_id, duration_ms, composite.score_autenticidad
    );

    AnalysisReport {
        correlation_id: request.correlation_id.clone(),
        image_id: request.image_id.clone(),
        texture,
        definition,
        artifacts,
        forensics,
        composite,
        duration_ms,
    }
}

fn disabled(name: &str, version: &str) -> AnalyzerResult {
    AnalyzerResult::new(name, version).with_detail("mensaje", "analizador deshabilitado")
}
