use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::EditorRecord;

/// Trait for admin record storage backends.
///
/// Concurrent writers are not coordinated: the last write wins.
#[async_trait]
pub trait RecordStore<R: EditorRecord>: Send + Sync {
    /// Every record in the collection, in display order.
    async fn list(&self) -> Result<Vec<R>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<R>, StoreError>;

    /// Persist a new record, assigning its id when empty.
    async fn insert(&self, record: R) -> Result<R, StoreError>;

    /// Replace the record stored under `id`.
    async fn update(&self, id: &str, record: R) -> Result<R, StoreError>;

    /// Remove the record stored under `id`, returning it.
    async fn delete(&self, id: &str) -> Result<R, StoreError>;
}

/// In-memory record store using `DashMap`. Suitable for development and testing.
pub struct MemoryRecordStore<R: EditorRecord> {
    records: DashMap<String, R>,
}

impl<R: EditorRecord> MemoryRecordStore<R> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Whether another record (not `except_id`) already holds `key`.
    fn key_taken(&self, key: Option<&str>, except_id: &str) -> bool {
        let Some(key) = key else {
            return false;
        };
        self.records
            .iter()
            .any(|r| r.key() != except_id && r.value().unique_key().as_deref() == Some(key))
    }
}

impl<R: EditorRecord> Default for MemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: EditorRecord> RecordStore<R> for MemoryRecordStore<R> {
    async fn list(&self) -> Result<Vec<R>, StoreError> {
        let mut all: Vec<R> = self.records.iter().map(|r| r.value().clone()).collect();
        all.sort_by(R::display_cmp);
        Ok(all)
    }

    async fn get(&self, id: &str) -> Result<Option<R>, StoreError> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    async fn insert(&self, mut record: R) -> Result<R, StoreError> {
        if record.id().is_empty() {
            record.set_id(Uuid::new_v4().to_string());
        }
        if self.records.contains_key(record.id()) {
            return Err(StoreError::Duplicate(record.id().to_owned()));
        }
        let key = record.unique_key();
        if self.key_taken(key.as_deref(), record.id()) {
            return Err(StoreError::Duplicate(key.unwrap_or_default()));
        }
        self.records.insert(record.id().to_owned(), record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, mut record: R) -> Result<R, StoreError> {
        if !self.records.contains_key(id) {
            return Err(StoreError::NotFound(id.to_owned()));
        }
        record.set_id(id.to_owned());
        let key = record.unique_key();
        if self.key_taken(key.as_deref(), id) {
            return Err(StoreError::Duplicate(key.unwrap_or_default()));
        }
        self.records.insert(id.to_owned(), record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<R, StoreError> {
        self.records
            .remove(id)
            .map(|(_, r)| r)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))
    }
}
