//! Core image decoding, analysis, and scoring modules

pub mod analysis;
pub mod analyzer;
pub mod cancel;
pub mod config;
pub mod decoder;
pub mod result;
pub mod signal;

pub use analyzer::{
    analyze_image, analyze_request, AnalysisReport, AnalysisRequest, AnalyzerBuilder,
    ImageAnalyzer, ImageSource,
};
pub use cancel::CancelToken;
pub use config::AnalysisConfig;
pub use decoder::{decode_image, decode_image_bytes, DecodeError, ExifMetadata, ImageData};
pub use result::{
    AnalyzerResult, CompositeAuthenticityResult, Confidence, ConfidenceLabel, DetailValue,
    ForensicProbeResult, ProbeKind,
};
