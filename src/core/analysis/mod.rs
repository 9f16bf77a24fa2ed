//! Image analysis algorithms
//!
//! Contains the independent analyzer families:
//! - Texture/pattern analysis (repetitive synthetic textures)
//! - Definition/sharpness analysis
//! - Artifact/blockiness analysis (compression blocks, GAN checkerboards)
//! - Forensic authenticity suite (ELA, noise, EXIF, and friends)

mod artifacts;
mod definition;
pub mod forensics;
mod texture;

pub use artifacts::{analyze_artifacts, ArtifactFlags, ArtifactStats};
pub use artifacts::{NAME as ARTIFACTS_NAME, VERSION as ARTIFACTS_VERSION};
pub use definition::analyze_definition;
pub use definition::{NAME as DEFINITION_NAME, VERSION as DEFINITION_VERSION};
pub use forensics::{aggregate, run_forensic_suite};
pub use forensics::{NAME as FORENSICS_NAME, VERSION as FORENSICS_VERSION};
pub use texture::{analyze_texture, map_pattern_score, repetitive_pattern_raw, TextureFeatures};
pub use texture::{NAME as TEXTURE_NAME, VERSION as TEXTURE_VERSION};
