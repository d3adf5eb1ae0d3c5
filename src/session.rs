//! Per-identity permission session
//!
//! Holds the current record snapshot for one logged-in identity and replaces
//! it wholesale whenever the store reports a change. Resolver calls against a
//! snapshot are synchronous and may run from any number of tasks at once.
//!
//! Any failure to read the record leaves the session with an empty snapshot,
//! which denies everything.
//!
//! Sessions are for long-lived library callers (a portal front end holding
//! one per logged-in user). The HTTP server does not keep sessions: each
//! request builds a fresh snapshot through `AppState::snapshot_for`.

use crate::access_control::{
    CapabilityLevel, PermissionResolver, RoleFlags, SystemId, UserPermissionRecord,
};
use crate::auth::Identity;
use crate::store::{RecordSubscription, SharedStore, load_or_bootstrap};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Immutable view of one identity's permissions at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSnapshot {
    record: Option<UserPermissionRecord>,
    flags: RoleFlags,
}

impl PermissionSnapshot {
    /// Snapshot with no record: denies everything
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from an already-effective record, computing flags once
    pub fn new(record: Option<UserPermissionRecord>) -> Self {
        let flags = RoleFlags::from_record(record.as_ref());
        Self { record, flags }
    }

    pub fn record(&self) -> Option<&UserPermissionRecord> {
        self.record.as_ref()
    }

    pub fn flags(&self) -> RoleFlags {
        self.flags
    }

    pub fn has_system_permission(
        &self,
        resolver: &PermissionResolver,
        system: SystemId,
        required: CapabilityLevel,
    ) -> bool {
        resolver.has_system_permission(self.record(), system, required)
    }

    pub fn get_user_permission(
        &self,
        resolver: &PermissionResolver,
        system: SystemId,
    ) -> CapabilityLevel {
        resolver.get_user_permission(self.record(), system)
    }

    pub fn can_access_branch(&self, resolver: &PermissionResolver, branch_id: &str) -> bool {
        resolver.can_access_branch(self.record(), branch_id)
    }
}

/// Live permission state for a single identity
///
/// Dropping the session (or calling [`end`]) stops the background watcher.
///
/// [`end`]: PermissionSession::end
pub struct PermissionSession {
    identity: Identity,
    snapshot: watch::Receiver<Arc<PermissionSnapshot>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PermissionSession {
    /// Load the identity's record and start following changes
    pub async fn start(
        identity: Identity,
        store: SharedStore,
        resolver: Arc<PermissionResolver>,
    ) -> Self {
        let loaded = match load_or_bootstrap(store.as_ref(), &resolver, &identity).await {
            Ok(record) => record,
            Err(e) => {
                warn!(user = %identity.user_id, error = %e, "Failed to load permission record, denying");
                None
            }
        };

        let subscription = match store.subscribe(&identity.user_id).await {
            Ok(sub) => Some(sub),
            Err(e) => {
                warn!(user = %identity.user_id, error = %e, "Failed to subscribe to permission record");
                None
            }
        };

        // The subscription's value is at least as fresh as the initial load
        let initial = match &subscription {
            Some(sub) => {
                resolver.effective_record(&identity, sub.current().map(|r| (*r).clone()))
            }
            None => loaded,
        };

        let (tx, rx) = watch::channel(Arc::new(PermissionSnapshot::new(initial)));
        let cancel = CancellationToken::new();

        let task = subscription.map(|sub| {
            tokio::spawn(follow_changes(
                identity.clone(),
                store,
                resolver,
                sub,
                tx,
                cancel.clone(),
            ))
        });

        info!(user = %identity.user_id, "Permission session started");

        Self {
            identity,
            snapshot: rx,
            cancel,
            task,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<PermissionSnapshot> {
        if self.cancel.is_cancelled() {
            return Arc::new(PermissionSnapshot::empty());
        }
        self.snapshot.borrow().clone()
    }

    /// Wait until the snapshot is replaced. Returns `false` once the session
    /// has stopped following changes.
    pub async fn changed(&mut self) -> bool {
        self.snapshot.changed().await.is_ok()
    }

    /// End the session (logout). The snapshot is discarded.
    pub async fn end(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!(user = %self.identity.user_id, "Permission session ended");
    }
}

impl Drop for PermissionSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn follow_changes(
    identity: Identity,
    store: SharedStore,
    resolver: Arc<PermissionResolver>,
    mut subscription: RecordSubscription,
    tx: watch::Sender<Arc<PermissionSnapshot>>,
    cancel: CancellationToken,
) {
    loop {
        let change = tokio::select! {
            _ = cancel.cancelled() => break,
            change = subscription.changed() => change,
        };

        let Some(stored) = change else {
            debug!(user = %identity.user_id, "Permission store closed subscription");
            break;
        };

        if stored.is_none() && resolver.is_bootstrap(&identity) {
            // Recreate the bootstrap record; the write arrives as the next change
            if let Err(e) = load_or_bootstrap(store.as_ref(), &resolver, &identity).await {
                warn!(user = %identity.user_id, error = %e, "Failed to recreate bootstrap record");
            }
        }

        let effective = resolver.effective_record(&identity, stored.map(|r| (*r).clone()));
        let snapshot = PermissionSnapshot::new(effective);
        debug!(
            user = %identity.user_id,
            has_record = snapshot.record().is_some(),
            is_admin = snapshot.flags().is_admin,
            "Permission snapshot updated"
        );
        tx.send_replace(Arc::new(snapshot));
    }

    tx.send_replace(Arc::new(PermissionSnapshot::empty()));
}
