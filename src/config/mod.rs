#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

pub const DEFAULT_API_URL: &str = "https://api.dropboxapi.com";
pub const DEFAULT_CONTENT_URL: &str = "https://content.dropboxapi.com";

pub const ACCESS_TOKEN_ENV: &str = "DROPBOX_ACCESS_TOKEN";
pub const PATH_ENV: &str = "DROPBOX_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    pub access_token: String,
    /// Fixed remote folder for uploads; must be absolute.
    #[serde(default)]
    pub path: Option<String>,
    /// Sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_content_url")]
    pub content_url: String,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_content_url() -> String {
    DEFAULT_CONTENT_URL.to_string()
}

impl AdapterConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            path: None,
            headers: HashMap::new(),
            api_url: default_api_url(),
            content_url: default_content_url(),
            timeout_seconds: None,
        }
    }

    /// Reads `DROPBOX_ACCESS_TOKEN` (required) and `DROPBOX_PATH` (optional).
    pub fn from_env() -> Result<Self> {
        let token = env::var(ACCESS_TOKEN_ENV).map_err(|_| AdapterError::MissingConfigError {
            field: ACCESS_TOKEN_ENV.to_string(),
        })?;

        let mut config = Self::new(token);
        config.path = env::var(PATH_ENV).ok().filter(|p| !p.is_empty());
        Ok(config)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_content_url(mut self, url: impl Into<String>) -> Self {
        self.content_url = url.into();
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }
}

impl Validate for AdapterConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("access_token", &self.access_token)?;

        if let Some(path) = &self.path {
            validation::validate_absolute_path("path", path)?;
        }

        validation::validate_url("api_url", &self.api_url)?;
        validation::validate_url("content_url", &self.content_url)?;

        if let Some(timeout) = self.timeout_seconds {
            validation::validate_range("timeout_seconds", timeout, 1, 3600)?;
        }

        Ok(())
    }
}
