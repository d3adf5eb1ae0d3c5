//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Conventional variables (PORTAL_ADMIN_PASSWORD, PORTAL_MASTER_EMAIL)
//! 2. Environment variables (BRANCH_GATE__*)
//! 3. Configuration file (TOML)
//! 4. Default values

use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "branch-gate.toml",
    ".branch-gate.toml",
    "~/.config/branch-gate/config.toml",
    "/etc/branch-gate/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // First existing default path wins
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // e.g. BRANCH_GATE__SERVER__PORT -> server.port
    // Values stay strings: the admin password must survive verbatim ("0042")
    builder = builder.add_source(Environment::with_prefix("BRANCH_GATE").separator("__"));

    for (env_var, key) in [
        ("PORTAL_ADMIN_PASSWORD", "server.admin_password"),
        ("PORTAL_MASTER_EMAIL", "access.bootstrap_email"),
    ] {
        if let Ok(value) = std::env::var(env_var)
            && !value.is_empty()
        {
            builder = builder
                .set_override(key, value)
                .map_err(|e| ConfigError::Load(e.to_string()))?;
        }
    }

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::Invalid {
            message: "server.port must be greater than 0".to_string(),
        });
    }

    if config.server.host.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "server.host".to_string(),
        });
    }

    if let Some(email) = &config.access.bootstrap_email
        && !email.contains('@')
    {
        return Err(ConfigError::Invalid {
            message: format!(
                "access.bootstrap_email must be an email address, got: {}",
                email
            ),
        });
    }

    if let Some(path) = &config.store.path
        && path.trim().is_empty()
    {
        return Err(ConfigError::Invalid {
            message: "store.path must not be empty when set".to_string(),
        });
    }

    Ok(())
}
