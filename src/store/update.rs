//! Partial admin updates to a permission record

use crate::access_control::{
    CapabilityLevel, Role, SystemCatalog, SystemId, UserPermissionRecord,
};
use crate::error::StoreError;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Fields an admin may change on a record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PermissionUpdate {
    /// Target user. Filled from the route path by the HTTP layer.
    #[serde(default)]
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    /// Replaces the whole permission map
    pub permissions: Option<BTreeMap<SystemId, CapabilityLevel>>,
    /// Replaces the whole branch set
    pub allowed_branches: Option<BTreeSet<String>>,
}

impl PermissionUpdate {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn permission(mut self, system: SystemId, level: CapabilityLevel) -> Self {
        self.permissions
            .get_or_insert_with(BTreeMap::new)
            .insert(system, level);
        self
    }

    pub fn branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_branches = Some(branches.into_iter().map(Into::into).collect());
        self
    }

    /// Apply this update to an existing record, or create a new one
    ///
    /// New records start from the catalog's default levels; explicit
    /// permissions in the update are laid over them.
    pub fn apply(
        self,
        existing: Option<UserPermissionRecord>,
    ) -> Result<UserPermissionRecord, StoreError> {
        if self.user_id.trim().is_empty() {
            return Err(StoreError::Invalid("userId must not be empty".to_string()));
        }

        let is_new = existing.is_none();
        let mut record = match existing {
            Some(mut record) => {
                if record.user_id != self.user_id {
                    return Err(StoreError::Invalid(format!(
                        "update for '{}' applied to record of '{}'",
                        self.user_id, record.user_id
                    )));
                }
                record.touch();
                record
            }
            None => {
                let catalog = SystemCatalog;
                let mut record = UserPermissionRecord::new(&self.user_id, Role::User);
                for info in catalog.entries() {
                    if info.default_permission != CapabilityLevel::None {
                        record.permissions.insert(info.id, info.default_permission);
                    }
                }
                record
            }
        };

        if let Some(email) = self.email {
            record.email = Some(email);
        }
        if let Some(name) = self.name {
            record.name = Some(name);
        }
        if let Some(role) = self.role {
            record.role = role;
        }
        if let Some(permissions) = self.permissions {
            if is_new {
                // keep seeded defaults for systems the update omits
                record.permissions.extend(permissions);
            } else {
                record.permissions = permissions;
            }
        }
        if let Some(branches) = self.allowed_branches {
            record.allowed_branches = branches;
        }

        Ok(record)
    }
}
