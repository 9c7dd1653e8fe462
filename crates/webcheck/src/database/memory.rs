use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::CheckStore;
use super::error::StoreError;
use super::models::{CheckKind, CheckRecord};

#[derive(Default)]
struct Tables {
    next_id: i64,
    records: BTreeMap<i64, CheckRecord>,
}

/// In-process store with the same contract as [`super::LibsqlStore`].
///
/// Ids are shared across kinds and never reused.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckStore for MemoryStore {
    async fn insert(&self, record: &CheckRecord) -> Result<i64, StoreError> {
        let kind = record.kind();
        let mut tables = self.tables.lock().await;

        if tables.records.values().any(|r| r.kind() == kind && r.url == record.url) {
            return Err(StoreError::Duplicate { kind, url: record.url.clone() });
        }

        tables.next_id += 1;
        let id = tables.next_id;
        let mut stored = record.clone();
        stored.id = Some(id);
        tables.records.insert(id, stored);
        Ok(id)
    }

    async fn find_due(&self, kind: CheckKind, now: i64) -> Result<Vec<CheckRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .records
            .values()
            .filter(|r| r.kind() == kind && r.run_after < now)
            .cloned()
            .collect())
    }

    async fn update(&self, record: &CheckRecord) -> Result<(), StoreError> {
        let kind = record.kind();
        let Some(id) = record.id else {
            return Err(StoreError::NotPersistent { kind, url: record.url.clone() });
        };

        let mut tables = self.tables.lock().await;
        match tables.records.get_mut(&id) {
            Some(existing) if existing.kind() == kind => {
                *existing = record.clone();
                Ok(())
            }
            _ => Err(StoreError::NotFound { kind, id }),
        }
    }

    async fn delete(&self, kind: CheckKind, url: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let id = tables
            .records
            .iter()
            .find(|(_, r)| r.kind() == kind && r.url == url)
            .map(|(id, _)| *id);

        Ok(id.and_then(|id| tables.records.remove(&id)).is_some())
    }

    async fn list_all(&self, kind: CheckKind) -> Result<Vec<CheckRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.records.values().filter(|r| r.kind() == kind).cloned().collect())
    }
}
