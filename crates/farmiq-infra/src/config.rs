//! Configuration loader for FarmIQ.
//!
//! Reads `config.toml` and deserializes it into [`AppConfig`]. A missing
//! file yields the defaults; a file that exists but cannot be read or
//! parsed is a startup error. `FARMIQ_*` environment variables override
//! the discriminators and secrets after parsing.

use std::path::{Path, PathBuf};

use farmiq_types::config::AppConfig;
use farmiq_types::error::ConfigError;
use secrecy::SecretString;

/// Resolve the data directory.
///
/// Priority:
/// 1. `FARMIQ_DATA_DIR` environment variable
/// 2. `~/.farmiq`
/// 3. `.farmiq` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FARMIQ_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".farmiq");
    }
    PathBuf::from(".farmiq")
}

/// The config file to load: the explicit path if given, else
/// `{data_dir}/config.toml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => resolve_data_dir().join("config.toml"),
    }
}

/// Load configuration from `path`.
pub async fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                reason: err.to_string(),
            });
        }
    };

    let config = toml::from_str::<AppConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Apply `FARMIQ_*` overrides from the process environment.
pub fn apply_env_overrides(config: &mut AppConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

/// Apply overrides from any variable source.
///
/// | variable | field |
/// |---|---|
/// | `FARMIQ_MEMORY_STORE_TYPE` | `memory_store.type` |
/// | `FARMIQ_CHAT_STORE_TYPE` | `chat_store.type` |
/// | `FARMIQ_AI_SERVICE_TYPE` | `ai_service.type` |
/// | `FARMIQ_AI_SERVICE_ENDPOINT` | `ai_service.endpoint` |
/// | `FARMIQ_AI_SERVICE_KEY` | `ai_service.key` |
/// | `FARMIQ_CONTENT_SAFETY_KEY` | `content_safety.key` |
pub fn apply_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(value) = var("FARMIQ_MEMORY_STORE_TYPE") {
        config.memory_store.store_type = value;
    }
    if let Some(value) = var("FARMIQ_CHAT_STORE_TYPE") {
        config.chat_store.store_type = value;
    }
    if let Some(value) = var("FARMIQ_AI_SERVICE_TYPE") {
        config.ai_service.service_type = value;
    }
    if let Some(value) = var("FARMIQ_AI_SERVICE_ENDPOINT") {
        config.ai_service.endpoint = Some(value);
    }
    if let Some(value) = var("FARMIQ_AI_SERVICE_KEY") {
        config.ai_service.key = Some(SecretString::from(value));
    }
    if let Some(value) = var("FARMIQ_CONTENT_SAFETY_KEY") {
        config.content_safety.key = Some(SecretString::from(value));
    }
}
