use crate::error::AppError;
use crate::storage::json_store;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "onetwodo";
const CONFIG_FILE_NAME: &str = "config.json";
const LOG_DIR_NAME: &str = "logs";
pub const CONFIG_ENV_VAR: &str = "ONETWODO_CONFIG_PATH";
pub const LOG_LEVEL_ENV_VAR: &str = "ONETWODO_LOG";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Command word shortcuts, e.g. `"ls": "list all"`.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub store_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub aliases: HashMap<String, String>,
}

/// Per-user application directory: `$HOME/.config/onetwodo` or
/// `%APPDATA%\onetwodo`.
pub fn app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(app_dir()?.join(CONFIG_FILE_NAME))
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    Ok(normalize_aliases(config))
}

fn normalize_aliases(mut config: Config) -> Config {
    config.aliases = config
        .aliases
        .into_iter()
        .filter(|(alias, target)| !alias.trim().is_empty() && !target.trim().is_empty())
        .map(|(alias, target)| (alias.trim().to_ascii_lowercase(), target.trim().to_string()))
        .collect();
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(store_path) = overrides.store_path.as_ref() {
        merged.store_path = Some(store_path.clone());
    }
    if let Some(log_level) = overrides.log_level.as_ref() {
        merged.log_level = Some(log_level.clone());
    }
    if let Some(log_dir) = overrides.log_dir.as_ref() {
        merged.log_dir = Some(log_dir.clone());
    }

    for (alias, value) in overrides.aliases.iter() {
        merged
            .aliases
            .insert(alias.trim().to_ascii_lowercase(), value.clone());
    }

    merged
}

/// Data file location, first match wins: explicit path, the
/// `ONETWODO_STORE_PATH` variable, the config file, the platform default.
pub fn resolve_store_path(explicit: Option<&Path>, config: &Config) -> Result<PathBuf, AppError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(json_store::STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = config.store_path.as_ref() {
        return Ok(path.clone());
    }
    json_store::default_store_path()
}

pub fn resolve_log_dir(config: &Config) -> Result<PathBuf, AppError> {
    match config.log_dir.as_ref() {
        Some(dir) => Ok(dir.clone()),
        None => Ok(app_dir()?.join(LOG_DIR_NAME)),
    }
}

/// `ONETWODO_LOG` beats the config file; both fall back to the build default.
pub fn resolve_log_level(config: &Config) -> String {
    std::env::var(LOG_LEVEL_ENV_VAR)
        .ok()
        .filter(|level| !level.trim().is_empty())
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| crate::logging::default_log_level().to_string())
}
