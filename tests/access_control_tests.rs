//! Permission resolver integration tests
//!
//! Covers:
//! - Role tiers × capability levels × systems
//! - Explicit `none` opt-out for near-total roles
//! - Branch filtering, including the empty-set sentinel
//! - The admin / deputy_master asymmetry on branches
//! - Missing records (fail-closed)
//! - Bootstrap identity override

use branch_gate::access_control::{
    BootstrapIdentity, CapabilityLevel, PermissionResolver, Role, SystemId, UserPermissionRecord,
};
use branch_gate::auth::Identity;
use rstest::rstest;

// =============================================================================
// Test Helpers
// =============================================================================

const ALL_LEVELS: &[CapabilityLevel] = &[
    CapabilityLevel::None,
    CapabilityLevel::Read,
    CapabilityLevel::Write,
    CapabilityLevel::Admin,
];

fn resolver() -> PermissionResolver {
    PermissionResolver::new(BootstrapIdentity::new("owner@example.com"))
}

fn record(role: Role) -> UserPermissionRecord {
    UserPermissionRecord::new("uid-test", role)
}

// =============================================================================
// 1. Maximal roles
// =============================================================================

mod maximal_roles {
    use super::*;

    #[rstest]
    #[case::master(Role::Master)]
    #[case::super_admin(Role::SuperAdmin)]
    fn test_every_system_every_level(#[case] role: Role) {
        let resolver = resolver();
        // Even an explicit "none" does not restrict maximal roles
        let record = record(role)
            .with_permission(SystemId::SystemLogin, CapabilityLevel::None)
            .with_branches(["b1"]);

        for system in SystemId::all() {
            for level in ALL_LEVELS {
                assert!(
                    resolver.has_system_permission(Some(&record), *system, *level),
                    "{role} should have {level} on {system}"
                );
            }
            assert_eq!(
                resolver.get_user_permission(Some(&record), *system),
                CapabilityLevel::Admin
            );
        }
    }

    #[rstest]
    #[case::master(Role::Master)]
    #[case::super_admin(Role::SuperAdmin)]
    fn test_every_branch(#[case] role: Role) {
        let resolver = resolver();
        let record = record(role).with_branches(["b1"]);

        for branch in ["b1", "b2", "anything", ""] {
            assert!(resolver.can_access_branch(Some(&record), branch));
        }
    }
}

// =============================================================================
// 2. Near-total roles (admin, deputy_master)
// =============================================================================

mod near_total_roles {
    use super::*;

    #[rstest]
    #[case::admin(Role::Admin)]
    #[case::deputy_master(Role::DeputyMaster)]
    fn test_explicit_none_denies(#[case] role: Role) {
        let resolver = resolver();
        let record = record(role).with_permission(SystemId::Deposit, CapabilityLevel::None);

        assert!(!resolver.can_read(Some(&record), SystemId::Deposit));
        assert!(!resolver.has_system_permission(
            Some(&record),
            SystemId::Deposit,
            CapabilityLevel::None
        ));
        assert_eq!(
            resolver.get_user_permission(Some(&record), SystemId::Deposit),
            CapabilityLevel::None
        );
    }

    #[rstest]
    #[case::admin_absent(Role::Admin, None)]
    #[case::admin_read(Role::Admin, Some(CapabilityLevel::Read))]
    #[case::admin_write(Role::Admin, Some(CapabilityLevel::Write))]
    #[case::deputy_absent(Role::DeputyMaster, None)]
    #[case::deputy_read(Role::DeputyMaster, Some(CapabilityLevel::Read))]
    #[case::deputy_admin(Role::DeputyMaster, Some(CapabilityLevel::Admin))]
    fn test_stored_value_ignored_unless_none(
        #[case] role: Role,
        #[case] stored: Option<CapabilityLevel>,
    ) {
        let resolver = resolver();
        let mut record = record(role);
        if let Some(level) = stored {
            record = record.with_permission(SystemId::Purchase, level);
        }

        for level in ALL_LEVELS {
            assert!(resolver.has_system_permission(Some(&record), SystemId::Purchase, *level));
        }
        assert_eq!(
            resolver.get_user_permission(Some(&record), SystemId::Purchase),
            CapabilityLevel::Admin
        );
    }

    #[rstest]
    #[case::admin(Role::Admin)]
    #[case::deputy_master(Role::DeputyMaster)]
    fn test_opt_out_is_per_system(#[case] role: Role) {
        let resolver = resolver();
        let record = record(role).with_permission(SystemId::SystemLogin, CapabilityLevel::None);

        for system in SystemId::all() {
            let expected = *system != SystemId::SystemLogin;
            assert_eq!(resolver.can_read(Some(&record), *system), expected);
        }
    }
}

// =============================================================================
// 3. Ordinary roles (user, branch_manager)
// =============================================================================

mod ordinary_roles {
    use super::*;

    #[test]
    fn test_user_with_purchase_read() {
        let resolver = resolver();
        let record =
            record(Role::User).with_permission(SystemId::Purchase, CapabilityLevel::Read);

        assert!(resolver.has_system_permission(
            Some(&record),
            SystemId::Purchase,
            CapabilityLevel::Read
        ));
        assert!(!resolver.has_system_permission(
            Some(&record),
            SystemId::Purchase,
            CapabilityLevel::Write
        ));
        assert!(!resolver.has_system_permission(
            Some(&record),
            SystemId::NaverRanking,
            CapabilityLevel::Read
        ));
    }

    #[rstest]
    fn test_level_matrix(
        #[values(Role::User, Role::BranchManager)] role: Role,
        #[values(
            CapabilityLevel::None,
            CapabilityLevel::Read,
            CapabilityLevel::Write,
            CapabilityLevel::Admin
        )]
        granted: CapabilityLevel,
        #[values(
            CapabilityLevel::None,
            CapabilityLevel::Read,
            CapabilityLevel::Write,
            CapabilityLevel::Admin
        )]
        required: CapabilityLevel,
    ) {
        let resolver = resolver();
        let record = record(role).with_permission(SystemId::Todo, granted);

        assert_eq!(
            resolver.has_system_permission(Some(&record), SystemId::Todo, required),
            granted >= required
        );
        assert_eq!(
            resolver.get_user_permission(Some(&record), SystemId::Todo),
            granted
        );
    }

    #[test]
    fn test_absent_key_is_none() {
        let resolver = resolver();
        let record = record(Role::BranchManager);

        for system in SystemId::all() {
            assert!(!resolver.can_read(Some(&record), *system));
            // "none" is always satisfied by "none"
            assert!(resolver.has_system_permission(
                Some(&record),
                *system,
                CapabilityLevel::None
            ));
        }
    }
}

// =============================================================================
// 4. Branch access
// =============================================================================

mod branch_access {
    use super::*;

    #[test]
    fn test_deputy_master_ignores_branch_set() {
        let resolver = resolver();
        let record = record(Role::DeputyMaster).with_branches(["b1", "b2"]);

        assert!(resolver.can_access_branch(Some(&record), "b1"));
        assert!(resolver.can_access_branch(Some(&record), "b3"));
    }

    #[test]
    fn test_admin_is_branch_filtered() {
        let resolver = resolver();
        let record = record(Role::Admin).with_branches(["b1", "b2"]);

        assert!(resolver.can_access_branch(Some(&record), "b1"));
        assert!(!resolver.can_access_branch(Some(&record), "b3"));
    }

    #[rstest]
    #[case::user(Role::User)]
    #[case::branch_manager(Role::BranchManager)]
    #[case::admin(Role::Admin)]
    fn test_empty_set_means_all(#[case] role: Role) {
        let resolver = resolver();
        let record = record(role);

        for branch in ["b1", "b999", "some-random-branch"] {
            assert!(resolver.can_access_branch(Some(&record), branch));
        }
    }

    #[test]
    fn test_branch_manager_membership() {
        let resolver = resolver();
        let record = record(Role::BranchManager).with_branches(["gangnam"]);

        assert!(resolver.can_access_branch(Some(&record), "gangnam"));
        assert!(!resolver.can_access_branch(Some(&record), "hongdae"));
    }
}

// =============================================================================
// 5. Missing record
// =============================================================================

mod missing_record {
    use super::*;

    #[test]
    fn test_everything_denied() {
        let resolver = resolver();

        for system in SystemId::all() {
            for level in ALL_LEVELS {
                assert!(!resolver.has_system_permission(None, *system, *level));
            }
        }
        for branch in ["b1", ""] {
            assert!(!resolver.can_access_branch(None, branch));
        }
        assert!(resolver.accessible_systems(None).iter().all(|s| !s.accessible));
    }
}

// =============================================================================
// 6. Bootstrap identity
// =============================================================================

mod bootstrap_identity {
    use super::*;

    #[test]
    fn test_stored_user_role_resolves_to_master() {
        let resolver = resolver();
        let identity = Identity::new("uid-owner", Some("owner@example.com"));
        let stored = UserPermissionRecord::new("uid-owner", Role::User)
            .with_permission(SystemId::Deposit, CapabilityLevel::None)
            .with_branches(["b1"]);

        let effective = resolver.effective_record(&identity, Some(stored));
        assert_eq!(effective.as_ref().map(|r| r.role), Some(Role::Master));
        assert!(resolver.can_read(effective.as_ref(), SystemId::Deposit));
        assert!(resolver.can_access_branch(effective.as_ref(), "b2"));
    }

    #[test]
    fn test_no_bootstrap_configured() {
        let resolver = PermissionResolver::new(BootstrapIdentity::none());
        let identity = Identity::new("uid-owner", Some("owner@example.com"));
        assert!(resolver.effective_record(&identity, None).is_none());
    }
}

// =============================================================================
// 7. Worked scenario
// =============================================================================

#[test]
fn test_admin_with_system_login_opt_out() {
    let resolver = resolver();
    let record = record(Role::Admin)
        .with_permission(SystemId::SystemLogin, CapabilityLevel::None)
        .with_branches(["b1"]);

    assert!(!resolver.has_system_permission(
        Some(&record),
        SystemId::SystemLogin,
        CapabilityLevel::Read
    ));
    assert!(resolver.has_system_permission(
        Some(&record),
        SystemId::ChatbotManagement,
        CapabilityLevel::Read
    ));
    assert!(resolver.can_access_branch(Some(&record), "b1"));
    assert!(!resolver.can_access_branch(Some(&record), "b2"));
}
