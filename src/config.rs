//! Configuration management for Manga Binder
//!
//! Zero-config by default: every directory resolves under a per-user data
//! root, and the extraction endpoint has a local default. A TOML file can
//! override any of it via `--config`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ConfigError, ConfigResult};

/// Application configuration, TOML-serializable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory layout for manifests, transient assets, and output
    #[serde(default)]
    pub storage: StorageConfig,
    /// Extraction service settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

impl AppConfig {
    /// Load configuration from an explicit file, or defaults when `None`
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let Some(path) = path else {
            debug!("no configuration file given, using defaults");
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::NotFound {
            path: path.to_path_buf(),
        })?;
        let config = toml::from_str(&raw)?;
        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Directory layout configuration
///
/// Unset directories resolve under one writable data root: saved manifests,
/// one transient asset subtree per run, and one subtree for finished
/// documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where per-title manifests are saved
    pub manifest_dir: Option<PathBuf>,
    /// Root for transient per-run asset directories
    pub assets_dir: Option<PathBuf>,
    /// Where finished documents land
    pub output_dir: Option<PathBuf>,
}

impl StorageConfig {
    fn data_root() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("manga-binder"))
            .unwrap_or_else(|| PathBuf::from("./manga-binder"))
    }

    /// Resolved manifest directory
    pub fn manifest_dir(&self) -> PathBuf {
        self.manifest_dir
            .clone()
            .unwrap_or_else(|| Self::data_root().join("manifests"))
    }

    /// Resolved transient assets root
    pub fn assets_dir(&self) -> PathBuf {
        self.assets_dir
            .clone()
            .unwrap_or_else(|| Self::data_root().join("assets"))
    }

    /// Resolved output directory
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| Self::data_root().join("bound"))
    }
}

/// Extraction service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Endpoint accepting `{title, source, instruction}` extraction requests
    pub endpoint: String,
    /// Optional bearer token for the extraction service
    pub api_key: Option<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8742/extract".to_string(),
            api_key: None,
        }
    }
}
