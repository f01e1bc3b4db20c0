//! Client settings: built-in defaults, then `employees.toml`, then environment.

use std::{fs, io, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5196/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
pub const SETTINGS_FILE: &str = "employees.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid api base url '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },
    #[error("invalid request timeout '{value}': expected a positive number of milliseconds")]
    InvalidTimeout { value: String },
    #[error("failed to read settings file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: Url,
    /// Upper bound on every gateway call.
    pub request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL)
                .expect("default api base url is valid"),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_ms: Option<u64>,
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Layers `path` (if it exists) and the variables returned by `env` over the defaults.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings =
                toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                    path: path.display().to_string(),
                    source,
                })?;
            if let Some(v) = file_cfg.api_base_url {
                settings.api_base_url = parse_api_base_url(&v)?;
            }
            if let Some(ms) = file_cfg.request_timeout_ms {
                settings.request_timeout = timeout_from_millis(&ms.to_string())?;
            }
            debug!(path = %path.display(), "loaded settings file");
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    }

    if let Some(v) = env("EMPLOYEES_API_URL") {
        settings.api_base_url = parse_api_base_url(&v)?;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = parse_api_base_url(&v)?;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        settings.request_timeout = timeout_from_millis(&v)?;
    }

    Ok(settings)
}

/// Accepts absolute `http`/`https` URLs only.
pub fn parse_api_base_url(raw: &str) -> Result<Url, ConfigError> {
    let value = raw.trim();
    let url = Url::parse(value).map_err(|err| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            value: value.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

pub fn timeout_from_millis(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidTimeout {
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
