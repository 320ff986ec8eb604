//! Application settings, persisted as camelCase JSON.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::core::ProcessingOptions;
use crate::utils::{UpscaleError, UpscaleResult};

/// Number of paths dispatched to the store before ingestion yields.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngestConfig {
    pub chunk_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Where results are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Next to each source image
    #[default]
    Original,
    /// Into `OutputSettings::dir`
    Custom,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputSettings {
    pub mode: OutputMode,
    pub dir: Option<PathBuf>,
    pub overwrite: bool,
}

impl OutputSettings {
    pub fn processing_options(&self) -> ProcessingOptions {
        let output_dir = match self.mode {
            OutputMode::Original => None,
            OutputMode::Custom => self.dir.clone(),
        };
        ProcessingOptions {
            output_dir,
            overwrite: self.overwrite,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub ingest: IngestConfig,
    pub output: OutputSettings,
    /// Directory holding model weight files
    pub models_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Loads settings from a JSON file; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> UpscaleResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            UpscaleError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> UpscaleResult<()> {
        if self.ingest.chunk_size == 0 {
            return Err(UpscaleError::config("ingest.chunkSize must be greater than 0"));
        }
        if self.output.mode == OutputMode::Custom && self.output.dir.is_none() {
            return Err(UpscaleError::config("output.dir is required when output.mode is custom"));
        }
        Ok(())
    }
}
