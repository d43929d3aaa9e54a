use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::types::SweepConfig;
use crate::validation::validate_config;

/// Environment variable naming a config file, consulted when no path is passed.
pub const CONFIG_ENV_VAR: &str = "DBSWEEP_CONFIG";

/// `~/.dbsweep/config.toml`, or `./.dbsweep/config.toml` without a home dir.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dbsweep")
        .join("config.toml")
}

/// Load configuration.
///
/// Priority: explicit path > `DBSWEEP_CONFIG` > default path. An explicit path
/// (or one named by the env var) must exist; a missing default file falls back
/// to built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<SweepConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config_from_path(path);
    }

    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return load_config_from_path(Path::new(&path));
    }

    let path = default_config_path();
    if !path.exists() {
        debug!(
            event = "config.load_defaults",
            path = %path.display(),
            reason = "default config file absent"
        );
        let config = SweepConfig::default();
        validate_config(&config)?;
        return Ok(config);
    }

    load_config_from_path(&path)
}

/// Load and validate a config file that must exist.
pub fn load_config_from_path(path: &Path) -> Result<SweepConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    info!(event = "config.loaded", path = %path.display());

    Ok(config)
}

/// Parse and validate TOML content.
pub fn parse_config(content: &str) -> Result<SweepConfig, ConfigError> {
    let config: SweepConfig = toml::from_str(content).map_err(|e| ConfigError::ConfigParseError {
        message: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}
