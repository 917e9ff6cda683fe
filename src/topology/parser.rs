//! Topology document loader.
//!
//! This module loads topology snapshots and compiled plans from YAML or JSON
//! documents, and loads `.env` files for settings overrides.

use crate::error::{ConfigError, Result, TopologyError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::model::Topology;

/// Document formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// YAML document (the default).
    Yaml,
    /// JSON document.
    Json,
}

/// Loader for topology documents.
#[derive(Debug, Default)]
pub struct TopologyParser {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

impl TopologyParser {
    /// Creates a new topology parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads a topology from a file, picking the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Topology> {
        let path = self.resolve(path.as_ref());
        info!("Loading topology from: {}", path.display());

        if !path.exists() {
            return Err(TopologyError::FileNotFound { path }.into());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            TopologyError::parse(
                format!("Failed to read file: {e}"),
                Some(path.display().to_string()),
            )
        })?;

        Self::parse(&content, DocumentFormat::from_path(&path), Some(&path))
    }

    /// Parses a topology from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is invalid.
    pub fn parse(content: &str, format: DocumentFormat, source: Option<&Path>) -> Result<Topology> {
        debug!("Parsing {format:?} topology document");
        let location = || source.map(|p| p.display().to_string());

        let topology: Topology = match format {
            DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| {
                TopologyError::parse(format!("YAML parse error: {e}"), location())
            })?,
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| {
                TopologyError::parse(format!("JSON parse error: {e}"), location())
            })?,
        };

        debug!("Parsed topology with {} nodes", topology.nodes.len());
        Ok(topology)
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| ConfigError::DotEnv {
                path: env_path.clone(),
                message: e.to_string(),
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_path {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl DocumentFormat {
    /// Picks the format from a file extension; anything but `.json` is YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}
