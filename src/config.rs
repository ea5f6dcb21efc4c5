//! Configuration loading.
//!
//! Configuration is loaded once at process start from TOML, with the
//! following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.medsource/config.toml` (user)
//! 3. `/etc/medsource/config.toml` (system)
//! 4. built-in defaults
//!
//! Nothing here is mutated after the worker is built.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cache::CacheConfig;
use crate::version::{CACHE_PREFIX, CACHE_VERSION};
use crate::worker::classify::DEFAULT_API_MARKER;
use crate::{MedsourceError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Interceptor identity and lifecycle settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Origin the worker is registered for; precache paths resolve against
    /// it (default: http://localhost:3000/).
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Prefix of every cache name (default: "medsource").
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,
    /// Version tag embedded in every cache name (default: build-time tag).
    #[serde(default = "default_cache_version")]
    pub cache_version: String,
    /// Critical paths stored in the static cache at install.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,
    /// Activate immediately after install instead of waiting (default: true).
    #[serde(default = "default_skip_waiting")]
    pub skip_waiting: bool,
    /// Path fragment marking backend API calls (default: "/api/").
    #[serde(default = "default_api_marker")]
    pub api_marker: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            precache: default_precache(),
            skip_waiting: default_skip_waiting(),
            api_marker: default_api_marker(),
        }
    }
}

fn default_origin() -> String {
    "http://localhost:3000/".to_string()
}

fn default_cache_prefix() -> String {
    CACHE_PREFIX.to_string()
}

fn default_cache_version() -> String {
    CACHE_VERSION.to_string()
}

fn default_precache() -> Vec<String> {
    vec!["/".to_string(), "/manifest.json".to_string()]
}

fn default_skip_waiting() -> bool {
    true
}

fn default_api_marker() -> String {
    DEFAULT_API_MARKER.to_string()
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.medsource/config.toml`
    /// 3. `/etc/medsource/config.toml`
    /// 4. defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_path(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read and parse a single config file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MedsourceError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            MedsourceError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(MedsourceError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".medsource").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/medsource/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}
