use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::aligner::AlignerParams;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO 639-1), optional; falls back to document metadata
    #[serde(default)]
    pub source_language: Option<String>,

    /// Target language code (ISO 639-1), optional; falls back to document metadata
    #[serde(default)]
    pub target_language: Option<String>,

    /// Aligner backend config
    #[serde(default)]
    pub aligner: AlignerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Aligner backend configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AlignerConfig {
    // @field: Service URL
    #[serde(default = "default_aligner_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Alignment tuning parameters forwarded to the backend
    #[serde(default)]
    pub params: AlignerParams,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_aligner_endpoint(),
            timeout_secs: default_timeout_secs(),
            params: AlignerParams::default(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_aligner_endpoint() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    // Alignment of long documents can take a while on CPU-only backends
    120
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages when configured
        if let Some(source) = &self.source_language {
            crate::language_utils::validate_supported_language(source)?;
        }
        if let Some(target) = &self.target_language {
            crate::language_utils::validate_supported_language(target)?;
        }

        if self.aligner.endpoint.trim().is_empty() {
            return Err(anyhow!("Aligner endpoint must not be empty"));
        }
        if self.aligner.timeout_secs == 0 {
            return Err(anyhow!("Aligner timeout must be at least 1 second"));
        }

        self.aligner.params.validate()?;

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: None,
            target_language: None,
            aligner: AlignerConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
