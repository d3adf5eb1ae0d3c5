//! Static catalog of portal systems
//!
//! Each system declares the level new users get by default and the level a
//! caller should request before showing its card as usable.

use crate::access_control::types::{CapabilityLevel, SystemId};
use serde::Serialize;

/// Catalog entry for a single system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub id: SystemId,
    pub name: &'static str,
    pub default_permission: CapabilityLevel,
    pub required_permission: CapabilityLevel,
}

const CATALOG: &[SystemInfo] = &[
    SystemInfo {
        id: SystemId::Schedule,
        name: "Scheduling",
        default_permission: CapabilityLevel::Read,
        required_permission: CapabilityLevel::Read,
    },
    SystemInfo {
        id: SystemId::Purchase,
        name: "Purchasing",
        default_permission: CapabilityLevel::None,
        required_permission: CapabilityLevel::Read,
    },
    SystemInfo {
        id: SystemId::NaverRanking,
        name: "Ranking tracker",
        default_permission: CapabilityLevel::None,
        required_permission: CapabilityLevel::Read,
    },
    SystemInfo {
        id: SystemId::Manual,
        name: "Manuals",
        default_permission: CapabilityLevel::Read,
        required_permission: CapabilityLevel::Read,
    },
    SystemInfo {
        id: SystemId::Todo,
        name: "TODO board",
        default_permission: CapabilityLevel::Read,
        required_permission: CapabilityLevel::Write,
    },
    SystemInfo {
        id: SystemId::SystemLogin,
        name: "System login vault",
        default_permission: CapabilityLevel::None,
        required_permission: CapabilityLevel::Read,
    },
    SystemInfo {
        id: SystemId::Deposit,
        name: "Deposit requests",
        default_permission: CapabilityLevel::None,
        required_permission: CapabilityLevel::Write,
    },
    SystemInfo {
        id: SystemId::ChatbotManagement,
        name: "Chatbot management",
        default_permission: CapabilityLevel::None,
        required_permission: CapabilityLevel::Admin,
    },
    SystemInfo {
        id: SystemId::UserManagement,
        name: "Permission management",
        default_permission: CapabilityLevel::None,
        required_permission: CapabilityLevel::Admin,
    },
];

/// The fixed system catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCatalog;

impl SystemCatalog {
    pub fn entries(&self) -> &'static [SystemInfo] {
        CATALOG
    }

    pub fn get(&self, id: SystemId) -> &'static SystemInfo {
        // CATALOG is laid out in SystemId declaration order
        &CATALOG[id as usize]
    }

    pub fn required_level(&self, id: SystemId) -> CapabilityLevel {
        self.get(id).required_permission
    }

    pub fn default_level(&self, id: SystemId) -> CapabilityLevel {
        self.get(id).default_permission
    }
}
