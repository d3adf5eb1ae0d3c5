//! branch-gate
//!
//! Role and branch permission resolution for a small-business operations
//! portal.
//!
//! ## Features
//!
//! - **Pure resolver** answering "may this user use system S at level L?" and
//!   "may this user see branch B?"
//! - **Bootstrap identity** injected from configuration, always `master`
//! - **Push-style sessions** that re-resolve on every record change
//! - **HTTP API** for callers and for admin record management
//! - **Flexible configuration** via TOML files and environment variables
//!
//! ## Resolution Model
//!
//! ```text
//! no record → deny
//! master / super_admin → allow everything
//! admin / deputy_master → allow systems unless explicitly "none"
//! everyone else → stored level ≥ required level
//! ```
//!
//! Branches: `master`, `super_admin` and `deputy_master` see all; everyone
//! else (including `admin`) is limited to `allowedBranches`, where an empty
//! set means all.
//!
//! ## Example Configuration
//!
//! ```toml
//! [server]
//! port = 20390
//! # admin password from PORTAL_ADMIN_PASSWORD env var
//!
//! [access]
//! bootstrap_email = "owner@example.com"
//!
//! [store]
//! path = "permissions.json"
//! ```

pub mod access_control;
pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod store;
pub mod util;

// Re-export main types
pub use access_control::{PermissionResolver, UserPermissionRecord};
pub use config::{AppConfig, load_config};
pub use error::{AccessDeniedError, StoreError};
pub use session::{PermissionSession, PermissionSnapshot};
