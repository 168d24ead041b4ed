use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::{AiodError, Result};

mod env;

pub const API_SERVER_ENV: &str = "AIOD_API_SERVER";
pub const API_VERSION_ENV: &str = "AIOD_API_VERSION";
pub const TIMEOUT_MS_ENV: &str = "AIOD_TIMEOUT_MS";
pub const TOKEN_FILE_ENV: &str = "AIOD_TOKEN_FILE";
pub const TOKEN_ENV: &str = "AIOD_TOKEN";

const DEFAULT_API_SERVER: &str = "https://api.aiod.eu/";
const DEFAULT_API_VERSION: &str = "v1";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_server: String,
    pub api_version: String,
    pub auth_path: String,
    pub revoke_path: String,
    pub whoami_path: String,
    pub bookmarks_path: String,
    pub timeout_ms: u64,
    pub token_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_server: DEFAULT_API_SERVER.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            auth_path: "auth/token".to_string(),
            revoke_path: "auth/revoke".to_string(),
            whoami_path: "authorization_test".to_string(),
            bookmarks_path: "bookmarks".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            token_file: None,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new(api_server: impl Into<String>) -> Self {
        Self {
            api_server: api_server.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            api_server: env::read_non_empty_env(API_SERVER_ENV).unwrap_or(defaults.api_server),
            api_version: env::read_non_empty_env(API_VERSION_ENV)
                .unwrap_or(defaults.api_version),
            timeout_ms: env::read_env_u64(TIMEOUT_MS_ENV, DEFAULT_TIMEOUT_MS, 1),
            token_file: env::read_non_empty_env(TOKEN_FILE_ENV).map(PathBuf::from),
            ..defaults
        };
        config.validated()
    }

    #[must_use]
    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Normalizes `api_server` to a single trailing slash and rejects
    /// anything that is not an http(s) URL.
    pub fn validated(mut self) -> Result<Self> {
        self.api_server = normalize_base_url(&self.api_server);
        let url = Url::parse(&self.api_server).map_err(|err| {
            AiodError::InvalidConfig(format!("invalid api server {}: {err}", self.api_server))
        })?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(AiodError::InvalidConfig(format!(
                    "unsupported api server scheme: {other}"
                )));
            }
        }
        if self.api_version.trim().is_empty() {
            return Err(AiodError::InvalidConfig(
                "api version must not be empty".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(AiodError::InvalidConfig(
                "timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Joins a relative endpoint path onto the api server.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{}", self.api_server, path.trim_start_matches('/'));
        Url::parse(&raw)
            .map_err(|err| AiodError::InvalidConfig(format!("invalid endpoint {raw}: {err}")))
    }

    pub(crate) fn auth_url(&self) -> Result<Url> {
        self.endpoint(&self.auth_path)
    }

    pub(crate) fn revoke_url(&self) -> Result<Url> {
        self.endpoint(&self.revoke_path)
    }

    pub(crate) fn whoami_url(&self) -> Result<Url> {
        self.endpoint(&self.whoami_path)
    }

    pub(crate) fn bookmarks_url(&self) -> Result<Url> {
        self.endpoint(&self.bookmarks_path)
    }
}

#[must_use]
pub(crate) fn token_from_env() -> Option<String> {
    env::read_non_empty_env(TOKEN_ENV)
}

fn normalize_base_url(raw: &str) -> String {
    format!("{}/", raw.trim().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_server_gets_exactly_one_trailing_slash() {
        let config = ClientConfig::new("https://api.example.test//")
            .validated()
            .expect("valid");
        assert_eq!(config.api_server, "https://api.example.test/");

        let config = ClientConfig::new("https://api.example.test/base")
            .validated()
            .expect("valid");
        assert_eq!(config.api_server, "https://api.example.test/base/");
    }

    #[test]
    fn non_http_api_server_is_rejected() {
        let err = ClientConfig::new("ftp://api.example.test")
            .validated()
            .expect_err("must fail");
        assert!(matches!(err, AiodError::InvalidConfig(_)));

        let err = ClientConfig::new("not a url")
            .validated()
            .expect_err("must fail");
        assert!(err.is_local());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = ClientConfig::new("https://api.example.test");
        config.timeout_ms = 0;
        assert!(config.validated().is_err());
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let config = ClientConfig::new("https://api.example.test/base")
            .validated()
            .expect("valid");
        let url = config.endpoint("/auth/token").expect("url");
        assert_eq!(url.as_str(), "https://api.example.test/base/auth/token");
    }
}
