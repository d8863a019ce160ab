//! Application configuration management.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML config file (platform config dir `config.toml`, or `--config`)
//! 3. `APODCACHE_*` environment variables (e.g. `APODCACHE_API_KEY`)
//! 4. Command-line flags
//!
//! # Example
//!
//! ```toml
//! api_key = "my-registered-key"
//! cache_dir = "/home/me/Pictures/apod"
//! timeout_secs = 60
//! background_command = "feh --bg-scale {path}"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::apod::client::{DEFAULT_API_URL, DEMO_API_KEY};
use crate::cli::Cli;

/// Prefix of environment variables read by [`Config`].
pub const ENV_PREFIX: &str = "APODCACHE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// api.nasa.gov key
    pub api_key: String,
    /// APOD API endpoint
    pub api_url: String,
    /// Parent directory of `imgcache`; platform data dir when unset
    pub cache_dir: Option<PathBuf>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Command that sets the desktop background; `{path}` is replaced by the image path
    pub background_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: DEMO_API_KEY.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            cache_dir: None,
            timeout_secs: 30,
            background_command: None,
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    ///
    /// A broken config file is logged and ignored.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from_path(path),
            None => Self::figment(None).extract().unwrap_or_else(|e| {
                log::warn!("Ignoring invalid configuration: {}", e);
                Self::default()
            }),
        }
    }

    /// Load the configuration from `path`, falling back to defaults on error.
    ///
    /// A missing file is not an error; environment variables still apply.
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config from {}, using defaults: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load the configuration from `path`, reporting parse errors.
    ///
    /// # Errors
    ///
    /// Returns the figment error for malformed TOML or mistyped values.
    pub fn try_load_from_path(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        Self::figment(Some(path.as_ref())).extract()
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Apply command-line overrides.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.cache_dir {
            self.cache_dir = Some(dir.clone());
        }
    }

    /// Default platform-specific configuration file path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Parent directory of the image cache.
    ///
    /// # Errors
    ///
    /// Fails when no directory is configured and the platform data directory
    /// cannot be determined.
    pub fn cache_parent(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories; use --cache-dir"))
    }

    /// Per-request network timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "apodcache", "apodcache")
}
