//! Per-user permission record
//!
//! Persisted document shape: one record per identity, keyed by `userId`.

use crate::access_control::types::{CapabilityLevel, Role, SystemId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stored permissions for a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermissionRecord {
    /// External auth subject identifier
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub role: Role,

    /// Per-system capability; missing systems resolve to `none`
    #[serde(default)]
    pub permissions: BTreeMap<SystemId, CapabilityLevel>,

    /// Branches this user may see. Empty means every branch.
    #[serde(default)]
    pub allowed_branches: BTreeSet<String>,

    /// Creation time, epoch milliseconds
    #[serde(default)]
    pub created_at: u64,

    /// Last mutation time, epoch milliseconds
    #[serde(default)]
    pub updated_at: u64,
}

impl UserPermissionRecord {
    /// Create a fresh record with both timestamps set to now
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        let now = now_millis();
        Self {
            user_id: user_id.into(),
            email: None,
            name: None,
            role,
            permissions: BTreeMap::new(),
            allowed_branches: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_permission(mut self, system: SystemId, level: CapabilityLevel) -> Self {
        self.permissions.insert(system, level);
        self
    }

    pub fn with_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_branches = branches.into_iter().map(Into::into).collect();
        self
    }

    /// Stored level for a system, `None` when absent
    pub fn stored_level(&self, system: SystemId) -> Option<CapabilityLevel> {
        self.permissions.get(&system).copied()
    }

    /// Whether the branch set is the "all branches" sentinel
    pub fn has_unrestricted_branches(&self) -> bool {
        self.allowed_branches.is_empty()
    }

    /// Bump `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.created_at);
    }
}

/// Physical store/location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
}

impl Branch {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Current time as Unix epoch milliseconds
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
