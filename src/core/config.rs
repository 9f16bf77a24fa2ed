// src/core/config.rs
//
// Analysis configuration with per-analyzer toggles.

/// Configuration shared by all analyzers for one request.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Seed for windowed sampling. Fixed seed makes runs reproducible.
    pub seed: u64,
    /// Hard cap on randomized texture samples.
    pub max_samples: usize,
    /// JPEG quality used for the ELA recompression pass.
    pub ela_quality: u8,
    pub check_texture: bool,
    pub check_definition: bool,
    pub check_artifacts: bool,
    pub check_forensics: bool,
    /// Per-request deadline in milliseconds; `None` disables the deadline.
    pub timeout_ms: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            max_samples: 500,
            ela_quality: 90,
            check_texture: true,
            check_definition: true,
            check_artifacts: true,
            check_forensics: true,
            timeout_ms: None,
        }
    }
}
