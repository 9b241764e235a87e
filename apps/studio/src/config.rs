use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_SETTINGS_FILE: &str = "studio.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub thumbnail_max_edge: u32,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            request_timeout_secs: 120,
            thumbnail_max_edge: 256,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    endpoint: Option<String>,
    api_key: Option<String>,
    request_timeout_secs: Option<u64>,
    thumbnail_max_edge: Option<u32>,
    log_filter: Option<String>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid generation endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Defaults, then the settings file, then environment overrides.
///
/// An explicit `path` must exist; the default `studio.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    load_settings_with_env(path, |key| std::env::var(key).ok())
}

fn load_settings_with_env(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();

    let file_cfg = match path {
        Some(path) => Some(read_file(path)?),
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if default_path.exists() {
                Some(read_file(default_path)?)
            } else {
                None
            }
        }
    };
    if let Some(file_cfg) = file_cfg {
        apply_file(&mut settings, file_cfg);
    }

    apply_env(&mut settings, env);
    validate_endpoint(&settings)?;
    Ok(settings)
}

fn read_file(path: &Path) -> Result<FileSettings, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.endpoint {
        settings.endpoint = Some(v);
    }
    if let Some(v) = file_cfg.api_key {
        settings.api_key = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.thumbnail_max_edge {
        settings.thumbnail_max_edge = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}

fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("VIEWSHIFT_ENDPOINT") {
        settings.endpoint = Some(v);
    }
    if let Some(v) = env("APP__ENDPOINT") {
        settings.endpoint = Some(v);
    }

    if let Some(v) = env("VIEWSHIFT_API_KEY") {
        settings.api_key = Some(v);
    }
    if let Some(v) = env("APP__API_KEY") {
        settings.api_key = Some(v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
    if let Some(v) = env("APP__THUMBNAIL_MAX_EDGE") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.thumbnail_max_edge = parsed;
        }
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    // blank values from the environment mean "unset"
    settings.endpoint = settings.endpoint.take().filter(|v| !v.trim().is_empty());
    settings.api_key = settings.api_key.take().filter(|v| !v.trim().is_empty());
}

fn validate_endpoint(settings: &Settings) -> Result<(), SettingsError> {
    let Some(endpoint) = &settings.endpoint else {
        return Ok(());
    };
    let invalid = |reason: String| SettingsError::InvalidEndpoint {
        endpoint: endpoint.clone(),
        reason,
    };
    let url = Url::parse(endpoint).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
