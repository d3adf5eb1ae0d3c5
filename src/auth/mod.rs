//! Authentication module
//!
//! Identity comes from the external identity provider via forwarded headers.
//! Admin mutations additionally require the shared portal password.

pub mod identity;
pub mod password;

pub use identity::{Identity, USER_EMAIL_HEADER, USER_ID_HEADER};
pub use password::{ADMIN_PASSWORD_HEADER, AdminGate};
