//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

use crate::core::AnalysisConfig;

#[derive(Parser, Debug)]
#[command(name = "imagecheckr")]
#[command(about = "Detect manipulated and AI-generated images")]
#[command(version)]
pub struct Args {
    /// Input file or directory
    #[arg(short, long)]
    pub input: PathBuf,

    /// JSON output format
    #[arg(long)]
    pub json: bool,

    /// Seed for the deterministic sampling stages
    #[arg(long)]
    pub seed: Option<u64>,

    /// Per-image analysis deadline in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Skip the texture analyzer
    #[arg(long)]
    pub no_texture: bool,

    /// Skip the definition analyzer
    #[arg(long)]
    pub no_definition: bool,

    /// Skip the artifact analyzer
    #[arg(long)]
    pub no_artifacts: bool,

    /// Skip the forensic probe suite
    #[arg(long)]
    pub no_forensics: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Translate CLI flags into an analyzer configuration.
    pub fn to_config(&self) -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.timeout_ms = self.timeout_ms;
        config.check_texture = !self.no_texture;
        config.check_definition = !self.no_definition;
        config.check_artifacts = !self.no_artifacts;
        config.check_forensics = !self.no_forensics;
        config
    }
}
