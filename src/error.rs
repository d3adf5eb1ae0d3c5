//! Error types for branch-gate
//!
//! Library errors are `thiserror` enums; the HTTP layer maps them to status
//! codes in `server::error`, and the binary wraps everything in `anyhow`.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },
}

/// Permission record store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No permission record for user '{user_id}'")]
    NotFound { user_id: String },

    #[error("Invalid permission record: {0}")]
    Invalid(String),
}

/// Access control errors
#[derive(Error, Debug)]
#[error("Access denied for '{subject}': {reason}")]
pub struct AccessDeniedError {
    pub subject: String,
    pub reason: String,
}

impl AccessDeniedError {
    pub fn new(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Denial for a caller that is not admin-or-higher
    pub fn admin_required(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            reason: "admin role or higher is required".into(),
        }
    }
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authenticated identity on request")]
    MissingIdentity,

    #[error("Invalid admin password")]
    InvalidPassword,

    #[error("Admin routes are disabled (no admin password configured)")]
    AdminDisabled,
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
