//! Configuration
//!
//! TOML file, `BRANCH_GATE__*` environment variables, then the portal's
//! conventional `PORTAL_ADMIN_PASSWORD` / `PORTAL_MASTER_EMAIL`.

pub mod loader;
pub mod types;

pub use loader::{load_config, load_config_from_str};
pub use types::{AccessConfig, AppConfig, LogFormat, LoggingConfig, ServerConfig, StoreConfig};
