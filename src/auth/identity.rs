//! Authenticated identity
//!
//! The external identity provider sits in front of the portal and forwards
//! the subject id and email as request headers.

use crate::error::AuthError;
use axum::http::HeaderMap;
use serde::Serialize;

/// Header carrying the external auth subject identifier
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated email, if any
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// An authenticated user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.map(str::to_string),
        }
    }

    /// Extract the identity from forwarded headers
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AuthError> {
        let user_id = header_str(headers, USER_ID_HEADER).ok_or(AuthError::MissingIdentity)?;
        Ok(Self::new(user_id, header_str(headers, USER_EMAIL_HEADER)))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
