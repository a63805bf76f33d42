use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Alignment tuning
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Optional top-level build timeout in seconds; on expiry the build
    /// reports partial diagnostics and no cross-reference map
    #[serde(default)]
    pub build_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow!("Failed to read config file {:?}: {}", path.as_ref(), e))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path.as_ref(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all values are inside their documented ranges.
    pub fn validate(&self) -> Result<()> {
        self.alignment.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alignment: AlignmentConfig::default(),
            log_level: LogLevel::default(),
            build_timeout_secs: None,
        }
    }
}

/// Tuning knobs of the cross-version aligner
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AlignmentConfig {
    /// Minimum token-set Jaccard similarity for a fallback candidate
    #[serde(default = "default_jaccard_threshold")]
    pub jaccard_threshold: f64,

    /// Maximum normalized edit-distance ratio for a fallback candidate
    #[serde(default = "default_levenshtein_threshold")]
    pub levenshtein_threshold: f64,

    /// Reference skeleton translation; defaults to the broadest-coverage
    /// translation when unset
    #[serde(default)]
    pub reference_translation: Option<String>,

    /// Half-width of the verse-number search window for the fallback pass
    #[serde(default = "default_neighbor_window")]
    pub neighbor_window: u32,
}

fn default_jaccard_threshold() -> f64 {
    0.70
}

fn default_levenshtein_threshold() -> f64 {
    0.15
}

fn default_neighbor_window() -> u32 {
    2
}

impl AlignmentConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.jaccard_threshold) {
            return Err(anyhow!(
                "jaccard_threshold must be in [0, 1], got {}",
                self.jaccard_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.levenshtein_threshold) {
            return Err(anyhow!(
                "levenshtein_threshold must be in [0, 1], got {}",
                self.levenshtein_threshold
            ));
        }
        Ok(())
    }
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            jaccard_threshold: default_jaccard_threshold(),
            levenshtein_threshold: default_levenshtein_threshold(),
            reference_translation: None,
            neighbor_window: default_neighbor_window(),
        }
    }
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

impl LogLevel {
    // @returns: log crate level filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
