//! Permission record storage
//!
//! The store owns one [`UserPermissionRecord`] per identity and pushes every
//! change to subscribers. Absence of a record is a valid state, not an error.

pub mod memory;
pub mod update;

pub use memory::MemoryStore;
pub use update::PermissionUpdate;

use crate::access_control::{PermissionResolver, Role, UserPermissionRecord};
use crate::auth::Identity;
use crate::error::StoreResult;
// async_trait required for dyn-compatibility with Arc<dyn PermissionStore>
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Source of permission records
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Current record for a user, `None` if the user has none
    async fn get(&self, user_id: &str) -> StoreResult<Option<UserPermissionRecord>>;

    /// Create or update a record, stamping timestamps
    async fn upsert(&self, update: PermissionUpdate) -> StoreResult<UserPermissionRecord>;

    /// Remove a record. Returns whether one existed.
    async fn delete(&self, user_id: &str) -> StoreResult<bool>;

    /// All records
    async fn list(&self) -> StoreResult<Vec<UserPermissionRecord>>;

    /// Subscribe to changes of a single user's record
    async fn subscribe(&self, user_id: &str) -> StoreResult<RecordSubscription>;

    /// Short backend name (for logging)
    fn backend(&self) -> &'static str;
}

/// Shared store handle
pub type SharedStore = Arc<dyn PermissionStore>;

/// Push-style view of one user's record
///
/// Starts at the record's value when subscribed; [`changed`] resolves on
/// every later write or delete.
///
/// [`changed`]: RecordSubscription::changed
pub struct RecordSubscription {
    rx: watch::Receiver<Option<Arc<UserPermissionRecord>>>,
}

impl RecordSubscription {
    pub fn new(rx: watch::Receiver<Option<Arc<UserPermissionRecord>>>) -> Self {
        Self { rx }
    }

    /// Latest known value
    pub fn current(&self) -> Option<Arc<UserPermissionRecord>> {
        self.rx.borrow().clone()
    }

    /// Whether a change arrived that `changed` has not yet returned
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next change. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Option<Arc<UserPermissionRecord>>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Load a user's record, lazily creating one for the bootstrap identity
///
/// The returned record has the bootstrap override applied.
pub async fn load_or_bootstrap(
    store: &dyn PermissionStore,
    resolver: &PermissionResolver,
    identity: &Identity,
) -> StoreResult<Option<UserPermissionRecord>> {
    let mut stored = store.get(&identity.user_id).await?;

    if stored.is_none() && resolver.is_bootstrap(identity) {
        let mut update = PermissionUpdate::new(&identity.user_id).role(Role::Master);
        update.email = identity.email.clone();
        stored = Some(store.upsert(update).await?);
        info!(user = %identity.user_id, "Created bootstrap master record");
    }

    Ok(resolver.effective_record(identity, stored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_control::BootstrapIdentity;

    #[tokio::test]
    async fn test_bootstrap_record_created_once() {
        let store = MemoryStore::new();
        let resolver = PermissionResolver::new(BootstrapIdentity::new("owner@example.com"));
        let identity = Identity::new("uid-owner", Some("owner@example.com"));

        let record = load_or_bootstrap(&store, &resolver, &identity)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.role, Role::Master);

        let persisted = store.get("uid-owner").await.unwrap().unwrap();
        assert_eq!(persisted.role, Role::Master);
        assert_eq!(persisted.email.as_deref(), Some("owner@example.com"));

        let again = load_or_bootstrap(&store, &resolver, &identity)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.created_at, record.created_at);
    }

    #[tokio::test]
    async fn test_stored_role_overridden_not_rewritten() {
        let store = MemoryStore::with_records([UserPermissionRecord::new("uid-owner", Role::User)]);
        let resolver = PermissionResolver::new(BootstrapIdentity::new("owner@example.com"));
        let identity = Identity::new("uid-owner", Some("owner@example.com"));

        let record = load_or_bootstrap(&store, &resolver, &identity)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.role, Role::Master);
        assert_eq!(store.get("uid-owner").await.unwrap().unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_record() {
        let store = MemoryStore::new();
        let resolver = PermissionResolver::new(BootstrapIdentity::new("owner@example.com"));
        let identity = Identity::new("uid-2", Some("staff@example.com"));

        assert!(
            load_or_bootstrap(&store, &resolver, &identity)
                .await
                .unwrap()
                .is_none()
        );
        assert!(store.list().await.unwrap().is_empty());
    }
}
