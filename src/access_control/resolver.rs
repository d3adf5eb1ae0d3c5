//! Permission resolver
//!
//! Answers two questions about a user's current permission record:
//! 1. May this user use system S at capability level L or higher?
//! 2. May this user see branch B?
//!
//! Resolution precedence for systems (highest to lowest):
//! 1. No record: deny
//! 2. Maximal roles (`master`, `super_admin`): allow
//! 3. Near-total roles (`admin`, `deputy_master`): allow unless the system is
//!    explicitly set to `none`
//! 4. Everyone else: stored level (absent = `none`) compared to the requirement
//!
//! Branch precedence:
//! 1. No record: deny
//! 2. `master`, `super_admin`, `deputy_master`: allow
//! 3. Empty `allowed_branches`: allow (means all branches)
//! 4. Membership in `allowed_branches`
//!
//! Plain `admin` is intentionally missing from branch step 2.

use crate::access_control::catalog::SystemCatalog;
use crate::access_control::record::{Branch, UserPermissionRecord};
use crate::access_control::types::{CapabilityLevel, Role, RoleTier, SystemId};
use crate::auth::Identity;
use crate::error::AccessDeniedError;
use serde::Serialize;
use tracing::{debug, trace};

/// Identity that is always promoted to `master`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapIdentity {
    email: Option<String>,
}

impl BootstrapIdentity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
        }
    }

    /// No bootstrap identity configured
    pub fn none() -> Self {
        Self { email: None }
    }

    pub fn from_config(email: Option<&str>) -> Self {
        Self {
            email: email.map(str::to_string),
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Exact match against the configured email
    pub fn matches(&self, email: Option<&str>) -> bool {
        match (&self.email, email) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }
}

/// Result of an access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Access is allowed
    Allowed,
    /// Access is denied with a reason
    Denied(String),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AccessDecision::Denied(_))
    }
}

/// Role flags derived from a record, computed once per record update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleFlags {
    pub is_super_admin: bool,
    pub is_master: bool,
    pub is_deputy_master: bool,
    pub is_branch_manager: bool,
    /// Admin or higher
    pub is_admin: bool,
}

impl RoleFlags {
    pub fn from_record(record: Option<&UserPermissionRecord>) -> Self {
        let Some(role) = record.map(|r| r.role) else {
            return Self::default();
        };

        Self {
            is_super_admin: role == Role::SuperAdmin,
            is_master: matches!(role, Role::Master | Role::SuperAdmin),
            is_deputy_master: role == Role::DeputyMaster,
            is_branch_manager: role == Role::BranchManager,
            is_admin: matches!(
                role,
                Role::Admin | Role::DeputyMaster | Role::Master | Role::SuperAdmin
            ),
        }
    }
}

/// Resolved access for one catalog system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemAccess {
    pub id: SystemId,
    pub name: &'static str,
    pub level: CapabilityLevel,
    pub required: CapabilityLevel,
    pub accessible: bool,
}

/// Permission resolver
///
/// Stateless apart from the injected bootstrap identity. All checks are pure
/// functions of the record passed in.
#[derive(Debug, Clone, Default)]
pub struct PermissionResolver {
    bootstrap: BootstrapIdentity,
    catalog: SystemCatalog,
}

impl PermissionResolver {
    /// Create a new resolver with the given bootstrap identity
    pub fn new(bootstrap: BootstrapIdentity) -> Self {
        Self {
            bootstrap,
            catalog: SystemCatalog,
        }
    }

    pub fn bootstrap(&self) -> &BootstrapIdentity {
        &self.bootstrap
    }

    pub fn catalog(&self) -> &SystemCatalog {
        &self.catalog
    }

    /// Whether `identity` is the configured bootstrap identity
    pub fn is_bootstrap(&self, identity: &Identity) -> bool {
        self.bootstrap.matches(identity.email.as_deref())
    }

    /// Apply the bootstrap override to a stored record
    ///
    /// The bootstrap identity always resolves to `master`: an existing record
    /// has its role coerced, a missing one is synthesized. Any other identity
    /// gets its record back unchanged.
    pub fn effective_record(
        &self,
        identity: &Identity,
        stored: Option<UserPermissionRecord>,
    ) -> Option<UserPermissionRecord> {
        if !self.is_bootstrap(identity) {
            return stored;
        }

        let mut record = stored.unwrap_or_else(|| {
            let mut record = UserPermissionRecord::new(&identity.user_id, Role::Master);
            record.email = identity.email.clone();
            record
        });
        if record.role != Role::Master {
            trace!(user = %identity.user_id, stored = %record.role, "Coercing bootstrap identity to master");
            record.role = Role::Master;
        }
        Some(record)
    }

    /// Check system access, returning a decision with a reason on denial
    pub fn check_system(
        &self,
        record: Option<&UserPermissionRecord>,
        system: SystemId,
        required: CapabilityLevel,
    ) -> AccessDecision {
        let Some(record) = record else {
            return AccessDecision::Denied("no permission record".to_string());
        };

        let stored = record.stored_level(system);
        let decision = match (record.role.tier(), stored) {
            (RoleTier::Maximal, _) => AccessDecision::Allowed,
            (RoleTier::NearTotal, Some(CapabilityLevel::None)) => AccessDecision::Denied(format!(
                "'{}' is explicitly set to 'none' for this user",
                system
            )),
            (RoleTier::NearTotal, _) => AccessDecision::Allowed,
            (RoleTier::Ordinary, stored) => {
                let granted = stored.unwrap_or_default();
                if granted.satisfies(required) {
                    AccessDecision::Allowed
                } else {
                    AccessDecision::Denied(format!(
                        "'{}' requires '{}' but only '{}' is granted",
                        system, required, granted
                    ))
                }
            }
        };

        debug!(
            user = %record.user_id,
            role = %record.role,
            system = %system,
            required = %required,
            allowed = decision.is_allowed(),
            "Resolved system permission"
        );
        decision
    }

    /// Can this record use `system` at `required` or higher?
    pub fn has_system_permission(
        &self,
        record: Option<&UserPermissionRecord>,
        system: SystemId,
        required: CapabilityLevel,
    ) -> bool {
        self.check_system(record, system, required).is_allowed()
    }

    /// `has_system_permission` at the default `read` requirement
    pub fn can_read(&self, record: Option<&UserPermissionRecord>, system: SystemId) -> bool {
        self.has_system_permission(record, system, CapabilityLevel::Read)
    }

    /// Resolved capability level for display
    pub fn get_user_permission(
        &self,
        record: Option<&UserPermissionRecord>,
        system: SystemId,
    ) -> CapabilityLevel {
        let Some(record) = record else {
            return CapabilityLevel::None;
        };

        match (record.role.tier(), record.stored_level(system)) {
            (RoleTier::Maximal, _) => CapabilityLevel::Admin,
            (RoleTier::NearTotal, Some(CapabilityLevel::None)) => CapabilityLevel::None,
            (RoleTier::NearTotal, _) => CapabilityLevel::Admin,
            (RoleTier::Ordinary, stored) => stored.unwrap_or_default(),
        }
    }

    /// Check branch visibility, returning a decision with a reason on denial
    pub fn check_branch(
        &self,
        record: Option<&UserPermissionRecord>,
        branch_id: &str,
    ) -> AccessDecision {
        let Some(record) = record else {
            return AccessDecision::Denied("no permission record".to_string());
        };

        let decision = if record.role.bypasses_branch_filter()
            || record.has_unrestricted_branches()
            || record.allowed_branches.contains(branch_id)
        {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied(format!(
                "branch '{}' is not in the user's allowed branches",
                branch_id
            ))
        };

        debug!(
            user = %record.user_id,
            role = %record.role,
            branch = branch_id,
            allowed = decision.is_allowed(),
            "Resolved branch access"
        );
        decision
    }

    /// Can this record see `branch_id`?
    pub fn can_access_branch(&self, record: Option<&UserPermissionRecord>, branch_id: &str) -> bool {
        self.check_branch(record, branch_id).is_allowed()
    }

    /// Keep only the branches this record may see
    pub fn filter_branches<'a>(
        &self,
        record: Option<&UserPermissionRecord>,
        branches: &'a [Branch],
    ) -> Vec<&'a Branch> {
        branches
            .iter()
            .filter(|b| self.can_access_branch(record, &b.id))
            .collect()
    }

    /// Resolve every catalog system against its required level
    pub fn accessible_systems(&self, record: Option<&UserPermissionRecord>) -> Vec<SystemAccess> {
        self.catalog
            .entries()
            .iter()
            .map(|info| SystemAccess {
                id: info.id,
                name: info.name,
                level: self.get_user_permission(record, info.id),
                required: info.required_permission,
                accessible: self.has_system_permission(record, info.id, info.required_permission),
            })
            .collect()
    }

    /// Check system access, returning an error if denied
    pub fn require_system(
        &self,
        record: Option<&UserPermissionRecord>,
        system: SystemId,
        required: CapabilityLevel,
    ) -> Result<(), AccessDeniedError> {
        match self.check_system(record, system, required) {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied(reason) => Err(AccessDeniedError::new(system.as_str(), reason)),
        }
    }

    /// Check branch visibility, returning an error if denied
    pub fn require_branch(
        &self,
        record: Option<&UserPermissionRecord>,
        branch_id: &str,
    ) -> Result<(), AccessDeniedError> {
        match self.check_branch(record, branch_id) {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied(reason) => Err(AccessDeniedError::new(branch_id, reason)),
        }
    }
}
