use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, env, fs, path::PathBuf};

use crate::model::Coordinates;
use crate::provider::ProviderId;

pub const DEFAULT_CITY: &str = "Chennai";

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    /// Overrides the provider's public endpoint, e.g. for a proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// How "my location" is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// When false, geolocation requests are refused.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fixed coordinates used instead of an IP lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<Coordinates>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self { enabled: true, home: None }
    }
}

fn default_true() -> bool {
    true
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// City shown when no location is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_city: Option<String>,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub location: LocationConfig,
}

impl Config {
    pub fn default_city(&self) -> &str {
        self.default_city.as_deref().unwrap_or(DEFAULT_CITY)
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    /// API keys from the environment take precedence over stored ones.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env_overrides(|name| env::var(name).ok());
        Ok(cfg)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Set/replace a provider API key, keeping any custom endpoint.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers
            .entry(provider_id.as_str().to_string())
            .and_modify(|cfg| cfg.api_key = api_key.clone())
            .or_insert(ProviderConfig { api_key, base_url: None });
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for id in ProviderId::all() {
            if let Some(key) = lookup(id.env_var()).filter(|k| !k.trim().is_empty()) {
                tracing::debug!(provider = %id, "using API key from {}", id.env_var());
                self.upsert_provider_api_key(*id, key);
            }
        }
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "liveweather", "liveweather")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
