use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    alias::{Alias, AliasTable},
    model::Units,
    provider::ProviderId,
    resolver::ResolveStrategy,
};

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// "metric" (°C) or "imperial" (°F).
    pub units: Units,

    /// "geocode" (Geocoding API) or "places" (Places Text Search).
    pub resolver: ResolveStrategy,

    /// Timeout applied to every HTTP call, in seconds.
    pub timeout_secs: u64,

    /// ISO country codes, most preferred first, used to rank geocoding candidates.
    pub country_preference: Vec<String>,

    /// Example TOML:
    /// [providers.google]
    /// api_key = "..."
    pub providers: HashMap<String, ProviderConfig>,

    /// Extra aliases layered over the built-in table:
    /// [aliases.ucla]
    /// city = "Los Angeles"
    /// country = "US"
    pub aliases: BTreeMap<String, Alias>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units: Units::Imperial,
            resolver: ResolveStrategy::Geocode,
            timeout_secs: 12,
            country_preference: ["US", "CA", "GB", "AU", "FR", "DE"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            providers: HashMap::new(),
            aliases: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
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
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
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
        let dirs = ProjectDirs::from("dev", "skytell", "skytell")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });
    }

    /// Returns API key for a provider, if present and non-empty.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers
            .get(provider_id.as_str())
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Built-in aliases merged with the ones from this config.
    pub fn alias_table(&self) -> AliasTable {
        AliasTable::with_extra(&self.aliases)
    }
}
