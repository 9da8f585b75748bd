//! Application configuration.
//!
//! Configuration is loaded from sources merged in order (later overrides
//! earlier):
//! 1. Global config: `~/.config/draftwork/config.json`
//! 2. An explicit `--config <path>` file
//! 3. Environment overrides: `DRAFTWORK_*` variables

use draftwork_provider::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory holding the document workspace and snapshot history.
    /// Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// CORS allow-list. Empty or containing `*` allows any origin.
    pub allowed_origins: Vec<String>,

    /// Ceiling on rewrite selection size, in characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_selection_chars: Option<usize>,

    /// Generation provider settings.
    pub provider: ProviderConfig,
}

impl Config {
    /// Load configuration from all sources.
    pub async fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = Config::default();

        if let Some(global_dir) = Self::global_config_dir() {
            let path = global_dir.join("config.json");
            if path.exists() {
                config = Self::load_file(&path).await?;
            }
        }

        if let Some(path) = config_path {
            config = Self::load_file(path).await?;
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Get the global config directory.
    ///
    /// On Unix, prefers `~/.config/draftwork` over the platform-specific
    /// directory for compatibility with other CLI tools.
    pub fn global_config_dir() -> Option<PathBuf> {
        #[cfg(unix)]
        {
            if let Some(home) = dirs::home_dir() {
                let xdg_config = home.join(".config").join("draftwork");
                if xdg_config.exists() {
                    return Some(xdg_config);
                }
            }
        }

        dirs::config_dir().map(|d| d.join("draftwork"))
    }

    /// Get the default data directory.
    pub fn default_data_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join("draftwork"))
    }

    /// The effective data directory.
    pub fn data_dir(&self) -> anyhow::Result<PathBuf> {
        self.data_dir
            .clone()
            .or_else(Self::default_data_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory"))
    }

    /// Load configuration from a file.
    pub async fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        let config = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Apply `DRAFTWORK_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("DRAFTWORK_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Ok(level) = std::env::var("DRAFTWORK_LOG_LEVEL") {
            self.log_level = Some(level);
        }
        if let Ok(key) = std::env::var("DRAFTWORK_API_KEY") {
            self.provider.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("DRAFTWORK_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Ok(model) = std::env::var("DRAFTWORK_MODEL") {
            self.provider.model = model;
        }
    }
}
