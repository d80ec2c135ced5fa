//! Configuration Management
//!
//! Persistent settings for bsctl. Effective values resolve as
//! CLI flag > environment > config file > default. The auth token is read
//! from the CLI or the environment only and never written to disk.

use crate::openstack::http::ClientOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_ENDPOINT: &str = "OS_VOLUME_ENDPOINT_OVERRIDE";
pub const ENV_PROJECT_ID: &str = "OS_PROJECT_ID";
pub const ENV_AUTH_TOKEN: &str = "OS_AUTH_TOKEN";

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Block storage endpoint, e.g. `https://evs.eu-de.otc.t-systems.com`
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("bsctl").join("config.json"))
    }

    /// Load configuration from the default location
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!("ignoring malformed config {:?}: {}", path, err);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;

        Ok(())
    }

    /// Get effective endpoint (CLI > env > config)
    pub fn effective_endpoint(&self, cli: Option<&str>) -> Option<String> {
        resolve(cli, ENV_ENDPOINT, self.endpoint.as_deref())
    }

    /// Get effective project (CLI > env > config)
    pub fn effective_project(&self, cli: Option<&str>) -> Option<String> {
        resolve(cli, ENV_PROJECT_ID, self.project_id.as_deref())
    }

    /// Get effective token (CLI > env)
    pub fn effective_token(cli: Option<&str>) -> Option<String> {
        resolve(cli, ENV_AUTH_TOKEN, None)
    }

    /// Transport options from the file, falling back to defaults
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::default();
        if let Some(secs) = self.timeout_secs {
            options.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(agent) = &self.user_agent {
            options.user_agent = agent.clone();
        }
        options
    }
}

/// First non-blank value of CLI, environment and file, in that order
fn resolve(cli: Option<&str>, env_key: &str, file: Option<&str>) -> Option<String> {
    let present = |v: &String| !v.trim().is_empty();
    cli.map(str::to_string)
        .filter(present)
        .or_else(|| std::env::var(env_key).ok().filter(present))
        .or_else(|| file.map(str::to_string).filter(present))
}
