use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{LinearError, Result};
use crate::transport::client::{Credentials, LicenseNotice, LinearClient};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub oauth_token: Option<String>,
    /// GraphQL endpoint override, for proxies and tests.
    pub api_url: Option<String>,
    pub max_pages: Option<usize>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    pub fn load_from(config_path: PathBuf) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| LinearError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| LinearError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "linear-connector")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(LinearError::NoConfigDir)
    }

    /// Where trigger registrations are kept, next to the config file.
    pub fn store_path() -> Result<PathBuf> {
        Self::config_path().map(|p| p.with_file_name("webhooks.json"))
    }

    /// Credentials with env vars taking precedence over the config file
    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_key: env_or("LINEAR_API_KEY", &self.api_key),
            oauth_token: env_or("LINEAR_OAUTH_TOKEN", &self.oauth_token),
        }
    }

    /// Write this config as TOML, creating the parent directory if needed.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        let write_error = |source| LinearError::ConfigWrite {
            path: config_path.to_path_buf(),
            source,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let contents = toml::to_string(self).map_err(|e| LinearError::InvalidParameter {
            name: "config".to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(config_path, contents).map_err(write_error)
    }

    /// Client configured from this file, sharing `notice` with other clients.
    pub fn client(&self, notice: Arc<LicenseNotice>) -> Result<LinearClient> {
        let mut client = LinearClient::new(self.credentials()).with_notice(notice);
        if let Some(api_url) = self.api_url.as_deref().filter(|u| !u.is_empty()) {
            Url::parse(api_url).map_err(|e| LinearError::InvalidUrl(format!("{api_url}: {e}")))?;
            client = client.with_endpoint(api_url);
        }
        if let Some(max_pages) = self.max_pages {
            client = client.with_max_pages(max_pages);
        }
        Ok(client)
    }
}

fn env_or(var: &str, fallback: &Option<String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .or_else(|| fallback.clone())
}
