//! Access control module
//!
//! Decides which authenticated user may see or modify which portal system
//! and which branch.
//!
//! ## Access Control Model
//!
//! Every user has at most one [`UserPermissionRecord`]. Resolution is a pure
//! function of that record:
//!
//! | Role | Systems | Branches |
//! |------|---------|----------|
//! | `master`, `super_admin` | everything | everything |
//! | `deputy_master` | everything except systems set to `none` | everything |
//! | `admin` | everything except systems set to `none` | filtered |
//! | `branch_manager`, `user` | stored level vs. required level | filtered |
//!
//! "Filtered" means membership in `allowedBranches`, where an empty set
//! grants every branch. A missing record denies everything.
//!
//! ## Example Record
//!
//! ```json
//! {
//!   "userId": "f3a9...",
//!   "role": "admin",
//!   "permissions": { "system-login": "none" },
//!   "allowedBranches": ["b1"]
//! }
//! ```

pub mod catalog;
pub mod record;
pub mod resolver;
pub mod types;

pub use catalog::{SystemCatalog, SystemInfo};
pub use record::{Branch, UserPermissionRecord};
pub use resolver::{AccessDecision, BootstrapIdentity, PermissionResolver, RoleFlags, SystemAccess};
pub use types::{CapabilityLevel, Role, RoleTier, SystemId};
