//! ImageCheckr - Detect manipulated and AI-generated images
//!
//! An image forensics tool that scores the authenticity of photographs by
//! running a battery of independent analyzers over the decoded pixel data
//! and metadata, then combining them into a weighted verdict.
//!
//! ## Features
//!
//! - **Error level analysis (ELA)**: Recompression differentials expose spliced regions
//! - **Noise fingerprinting**: Sensor noise correlation separates camera output from synthesis
//! - **EXIF consistency**: Camera tags, timestamps, and editor/generator signatures
//! - **Texture analysis**: Repetitive-pattern detection across a Gaussian pyramid
//! - **Artifact detection**: Compression blockiness, GAN checkerboards, smoothness anomalies
//! - **Composite verdict**: Weighted multi-probe score with a qualitative confidence label
//!
//! ## Module Structure
//!
//! - `core` - Decoding, signal primitives, analyzers, and the forensic suite
//! - `cli` - Command-line interface
//! - `testgen` - Synthetic image fixtures for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use imagecheckr::core::ImageAnalyzer;
//!
//! let analyzer = ImageAnalyzer::new("photo.jpg")?;
//! let report = analyzer.analyze();
//!
//! println!("Autenticidad: {:.0}%", report.composite.score_autenticidad * 100.0);
//! println!("Auténtica: {}", report.composite.es_autentico);
//! ```
//!
//! ## Forensic Probes
//!
//! | Probe       | Signal                                   | Weight |
//! |-------------|------------------------------------------|--------|
//! | ela         | JPEG recompression differential          | 0.22   |
//! | compression | 8x8 block variance uniformity            | 0.18   |
//! | noise       | Residual lag-1 autocorrelation           | 0.18   |
//! | exif        | Metadata presence and signatures         | 0.13   |
//! | color       | Per-channel variance balance             | 0.10   |
//! | edges       | High-pass edge density                   | 0.10   |
//! | frequency   | Radial energy peak count                 | 0.09   |

// Core analysis functionality
pub mod core;

// Command-line interface
pub mod cli;

// Synthetic test fixtures
pub mod testgen;

// Re-export commonly used types at crate root for convenience
pub use crate::core::{
    analyze_request, AnalysisConfig, AnalysisReport, AnalysisRequest, AnalyzerBuilder,
    AnalyzerResult, CompositeAuthenticityResult, Confidence, ConfidenceLabel,
    ForensicProbeResult, ImageAnalyzer, ProbeKind,
};
