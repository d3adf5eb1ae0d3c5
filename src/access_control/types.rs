//! Access control types
//!
//! Roles, capability levels and the closed set of portal systems.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Portal sub-system identifier
///
/// The set is closed: every card on the portal directory maps to exactly one
/// of these, and permission records may only carry levels for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SystemId {
    Schedule,
    Purchase,
    NaverRanking,
    Manual,
    Todo,
    SystemLogin,
    Deposit,
    ChatbotManagement,
    UserManagement,
}

impl SystemId {
    /// Get the system identifier as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemId::Schedule => "schedule",
            SystemId::Purchase => "purchase",
            SystemId::NaverRanking => "naver-ranking",
            SystemId::Manual => "manual",
            SystemId::Todo => "todo",
            SystemId::SystemLogin => "system-login",
            SystemId::Deposit => "deposit",
            SystemId::ChatbotManagement => "chatbot-management",
            SystemId::UserManagement => "user-management",
        }
    }

    /// Try to parse a system identifier from a string
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "schedule" => Some(SystemId::Schedule),
            "purchase" => Some(SystemId::Purchase),
            "naver-ranking" => Some(SystemId::NaverRanking),
            "manual" => Some(SystemId::Manual),
            "todo" => Some(SystemId::Todo),
            "system-login" => Some(SystemId::SystemLogin),
            "deposit" => Some(SystemId::Deposit),
            "chatbot-management" => Some(SystemId::ChatbotManagement),
            "user-management" => Some(SystemId::UserManagement),
            _ => None,
        }
    }

    /// Get all systems, in directory order
    pub fn all() -> &'static [SystemId] {
        &[
            SystemId::Schedule,
            SystemId::Purchase,
            SystemId::NaverRanking,
            SystemId::Manual,
            SystemId::Todo,
            SystemId::SystemLogin,
            SystemId::Deposit,
            SystemId::ChatbotManagement,
            SystemId::UserManagement,
        ]
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capability level granted on a system
///
/// Strict total order: `None < Read < Write < Admin`. The derived `Ord`
/// follows declaration order, so keep the variants sorted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityLevel {
    #[default]
    None,
    Read,
    Write,
    Admin,
}

impl CapabilityLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CapabilityLevel::None => "none",
            CapabilityLevel::Read => "read",
            CapabilityLevel::Write => "write",
            CapabilityLevel::Admin => "admin",
        }
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(CapabilityLevel::None),
            "read" => Some(CapabilityLevel::Read),
            "write" => Some(CapabilityLevel::Write),
            "admin" => Some(CapabilityLevel::Admin),
            _ => None,
        }
    }

    /// Check whether this level meets `required`
    pub fn satisfies(&self, required: CapabilityLevel) -> bool {
        *self >= required
    }
}

impl fmt::Display for CapabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User role
///
/// Roles are not a total order for every purpose: `Admin` and `DeputyMaster`
/// share system-level treatment but differ on branch access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    BranchManager,
    Admin,
    DeputyMaster,
    Master,
    SuperAdmin,
}

/// How a role resolves system capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTier {
    /// Capability comes from the per-system map
    Ordinary,
    /// Everything except systems explicitly set to `none`
    NearTotal,
    /// Everything, unconditionally
    Maximal,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::BranchManager => "branch_manager",
            Role::Admin => "admin",
            Role::DeputyMaster => "deputy_master",
            Role::Master => "master",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "branch_manager" => Some(Role::BranchManager),
            "admin" => Some(Role::Admin),
            "deputy_master" => Some(Role::DeputyMaster),
            "master" => Some(Role::Master),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    pub fn all() -> &'static [Role] {
        &[
            Role::User,
            Role::BranchManager,
            Role::Admin,
            Role::DeputyMaster,
            Role::Master,
            Role::SuperAdmin,
        ]
    }

    /// System capability tier for this role
    pub const fn tier(&self) -> RoleTier {
        match self {
            Role::Master | Role::SuperAdmin => RoleTier::Maximal,
            Role::Admin | Role::DeputyMaster => RoleTier::NearTotal,
            Role::User | Role::BranchManager => RoleTier::Ordinary,
        }
    }

    /// Whether this role sees every branch regardless of `allowed_branches`
    ///
    /// Plain `Admin` is deliberately absent: admins stay branch-filtered.
    pub const fn bypasses_branch_filter(&self) -> bool {
        matches!(self, Role::Master | Role::SuperAdmin | Role::DeputyMaster)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
