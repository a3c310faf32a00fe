/// Configuration system for repomap
///
/// Supports loading from a TOML file with per-field defaults; CLI arguments
/// override whatever the file provides.
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Extraction pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Call stack resolver configuration
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Extraction pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Worker count; 0 derives from available parallelism
    #[serde(default)]
    pub workers: usize,

    /// Maximum file size to read (in bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

/// Call stack resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Default maximum expansion depth
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default map output path
    #[serde(default = "default_output_path")]
    pub path: String,
}

fn default_max_file_size() -> usize {
    1_048_576 // 1 MB
}

fn default_max_depth() -> usize {
    5
}

fn default_output_path() -> String {
    "repomap.json".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            max_file_size: default_max_file_size(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Load from the given file if it exists, otherwise defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if p.exists() => Self::load_from_file(p),
            Some(p) => Err(ConfigError::LoadFailed(format!(
                "config file not found: {}",
                p.display()
            ))),
            None => Ok(Self::default()),
        }
    }

    /// Worker count as an option (0 means "derive")
    pub fn workers(&self) -> Option<usize> {
        if self.pipeline.workers == 0 {
            None
        } else {
            Some(self.pipeline.workers)
        }
    }
}
