use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub sink: SinkSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub input_csv: PathBuf,
    pub output_csv: PathBuf,
    pub sqlite_db: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SinkSection {
    pub table_name: String,
    pub sample_rows: usize,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            input_csv: PathBuf::from("data/amazon.csv"),
            output_csv: PathBuf::from("data/standardized_sales.csv"),
            sqlite_db: PathBuf::from("data/amazon_dw.db"),
        }
    }
}

impl Default for SinkSection {
    fn default() -> Self {
        Self {
            table_name: "ventas".to_string(),
            sample_rows: 5,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths: PathsSection::default(),
            sink: SinkSection::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config file: {}", path))?;

        let config: PipelineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse pipeline config file: {}", path))?;

        Ok(config)
    }

    /// The CLI takes no flags, so a missing config file falls back to the
    /// well-known default paths instead of aborting.
    pub fn load_or_default(path: &str) -> Self {
        if !Path::new(path).exists() {
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring unreadable config at {}: {:#}", path, e);
                Self::default()
            }
        }
    }
}
