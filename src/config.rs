//! Engine configuration with environment variable overrides
//!
//! Loading hierarchy: env > defaults. Overrides use the `KGCL_` prefix:
//! `KGCL_EYE_PATH`, `KGCL_TIMEOUT_SECONDS`, `KGCL_MAX_TICKS`.

use serde::{Deserialize, Serialize};

/// Configuration for the EYE reasoner subprocess
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonerConfig {
    /// Command or path for the EYE executable
    pub eye_path: String,
    /// Maximum reasoning time before the call is abandoned
    pub timeout_seconds: u64,
    /// Disable proof trace output (`--nope`)
    pub nope: bool,
    /// Emit the deductive closure (`--pass`)
    pub pass_all: bool,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            eye_path: "eye".to_string(),
            timeout_seconds: 30,
            nope: true,
            pass_all: true,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Reasoner subprocess configuration
    pub reasoner: ReasonerConfig,
    /// Default tick bound for run-to-completion
    pub max_ticks: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reasoner: ReasonerConfig::default(),
            max_ticks: 100,
        }
    }
}

impl EngineConfig {
    /// Build a configuration from defaults plus `KGCL_*` environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("KGCL_EYE_PATH") {
            config.reasoner.eye_path = path;
        }
        if let Ok(value) = std::env::var("KGCL_TIMEOUT_SECONDS") {
            match value.parse::<u64>() {
                Ok(seconds) if seconds > 0 => config.reasoner.timeout_seconds = seconds,
                _ => tracing::warn!("Ignoring invalid KGCL_TIMEOUT_SECONDS: {}", value),
            }
        }
        if let Ok(value) = std::env::var("KGCL_MAX_TICKS") {
            match value.parse::<u32>() {
                Ok(ticks) => config.max_ticks = ticks,
                Err(_) => tracing::warn!("Ignoring invalid KGCL_MAX_TICKS: {}", value),
            }
        }

        config
    }
}
