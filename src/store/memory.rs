//! In-memory permission store with optional JSON file persistence
//!
//! The whole record set lives in a map guarded by a single lock. When opened
//! with a path, the file is read once at startup and rewritten after every
//! mutation (write to a sibling temp file, then rename).

use crate::access_control::UserPermissionRecord;
use crate::error::{StoreError, StoreResult};
use crate::store::{PermissionStore, PermissionUpdate, RecordSubscription};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info};

type RecordSender = watch::Sender<Option<Arc<UserPermissionRecord>>>;

#[derive(Default)]
struct StoreInner {
    records: BTreeMap<String, UserPermissionRecord>,
    watchers: HashMap<String, RecordSender>,
}

impl StoreInner {
    fn notify(&mut self, user_id: &str) {
        self.prune_watchers();
        if let Some(sender) = self.watchers.get(user_id) {
            let current = self.records.get(user_id).cloned().map(Arc::new);
            sender.send_replace(current);
        }
    }

    /// Drop channels whose subscribers have all gone away
    fn prune_watchers(&mut self) {
        self.watchers.retain(|_, sender| sender.receiver_count() > 0);
    }
}

/// Permission store backed by a map, optionally mirrored to a JSON file
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
    path: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty, memory-only store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            path: None,
        }
    }

    /// Create a memory-only store seeded with records
    pub fn with_records(records: impl IntoIterator<Item = UserPermissionRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.user_id.clone(), r))
            .collect();
        Self {
            inner: RwLock::new(StoreInner {
                records,
                watchers: HashMap::new(),
            }),
            path: None,
        }
    }

    /// Open a file-backed store, loading existing records if the file exists
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let records = if tokio::fs::try_exists(&path).await? {
            let raw = tokio::fs::read_to_string(&path).await?;
            parse_records(&raw)?
        } else {
            BTreeMap::new()
        };

        info!(
            path = %path.display(),
            records = records.len(),
            "Opened permission store"
        );

        Ok(Self {
            inner: RwLock::new(StoreInner {
                records,
                watchers: HashMap::new(),
            }),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn persist(&self, records: &BTreeMap<String, UserPermissionRecord>) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_string_pretty(records)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, path).await?;

        debug!(path = %path.display(), records = records.len(), "Persisted permission store");
        Ok(())
    }
}

/// Parse the on-disk document, checking keys agree with `userId`
fn parse_records(raw: &str) -> StoreResult<BTreeMap<String, UserPermissionRecord>> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let records: BTreeMap<String, UserPermissionRecord> = serde_json::from_str(raw)?;
    for (key, record) in &records {
        if key != &record.user_id {
            return Err(StoreError::Invalid(format!(
                "record keyed '{}' has userId '{}'",
                key, record.user_id
            )));
        }
    }
    Ok(records)
}

#[async_trait]
impl PermissionStore for MemoryStore {
    async fn get(&self, user_id: &str) -> StoreResult<Option<UserPermissionRecord>> {
        Ok(self.inner.read().await.records.get(user_id).cloned())
    }

    async fn upsert(&self, update: PermissionUpdate) -> StoreResult<UserPermissionRecord> {
        let mut inner = self.inner.write().await;
        let user_id = update.user_id.clone();
        let existing = inner.records.get(&user_id).cloned();
        let created = existing.is_none();

        let record = update.apply(existing)?;
        let previous = inner.records.insert(user_id.clone(), record.clone());

        if let Err(e) = self.persist(&inner.records).await {
            // keep memory consistent with disk
            match previous {
                Some(previous) => inner.records.insert(user_id, previous),
                None => inner.records.remove(&user_id),
            };
            return Err(e);
        }

        inner.notify(&user_id);
        info!(
            user = %user_id,
            role = %record.role,
            created,
            "Saved permission record"
        );
        Ok(record)
    }

    async fn delete(&self, user_id: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(previous) = inner.records.remove(user_id) else {
            return Ok(false);
        };

        if let Err(e) = self.persist(&inner.records).await {
            inner.records.insert(user_id.to_string(), previous);
            return Err(e);
        }

        inner.notify(user_id);
        info!(user = %user_id, "Deleted permission record");
        Ok(true)
    }

    async fn list(&self) -> StoreResult<Vec<UserPermissionRecord>> {
        Ok(self.inner.read().await.records.values().cloned().collect())
    }

    async fn subscribe(&self, user_id: &str) -> StoreResult<RecordSubscription> {
        let mut inner = self.inner.write().await;
        inner.prune_watchers();
        let current = inner.records.get(user_id).cloned().map(Arc::new);
        let sender = inner
            .watchers
            .entry(user_id.to_string())
            .or_insert_with(|| watch::channel(current).0);
        Ok(RecordSubscription::new(sender.subscribe()))
    }

    fn backend(&self) -> &'static str {
        if self.path.is_some() { "file" } else { "memory" }
    }
}
