//! Shared admin password gate
//!
//! Admin mutation routes are guarded by a single static password shared by
//! the office staff, compared as a plain string.

use crate::error::AuthError;
use crate::util::SecretString;
use axum::http::HeaderMap;

/// Header carrying the shared admin password
pub const ADMIN_PASSWORD_HEADER: &str = "x-portal-password";

/// Verifies the shared admin password
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    password: Option<SecretString>,
}

impl AdminGate {
    pub fn new(password: Option<SecretString>) -> Self {
        Self {
            password: password.filter(|p| !p.expose_secret().is_empty()),
        }
    }

    /// Whether admin routes are usable at all
    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    pub fn verify(&self, provided: Option<&str>) -> Result<(), AuthError> {
        let Some(expected) = &self.password else {
            return Err(AuthError::AdminDisabled);
        };
        match provided {
            Some(p) if p == expected.expose_secret() => Ok(()),
            _ => Err(AuthError::InvalidPassword),
        }
    }

    pub fn verify_headers(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        self.verify(
            headers
                .get(ADMIN_PASSWORD_HEADER)
                .and_then(|v| v.to_str().ok()),
        )
    }
}
