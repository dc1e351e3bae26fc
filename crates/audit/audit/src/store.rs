use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AuditError;
use crate::record::{AuditLogEntry, AuditLogFilter, NewAuditLogEntry, SortOrder};

/// Trait for audit entry storage backends.
///
/// Audit entries are append-only: the trait has no update or delete
/// operation. Implementations must be `Send + Sync` to be shared across
/// async tasks.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist a new entry, assigning its `id` and `timestamp`.
    async fn insert(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry, AuditError>;

    /// Return up to `limit` entries matching `filter`, ordered by timestamp,
    /// skipping the first `offset`.
    async fn list(
        &self,
        filter: &AuditLogFilter,
        order: SortOrder,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<AuditLogEntry>, AuditError>;

    /// Count the entries matching `filter`.
    ///
    /// Must apply exactly the same constraints as [`AuditStore::list`].
    async fn count(&self, filter: &AuditLogFilter) -> Result<u64, AuditError>;

    /// Return every entry whose timestamp is strictly before `threshold`.
    async fn older_than(
        &self,
        threshold: DateTime<Utc>,
        order: SortOrder,
    ) -> Result<Vec<AuditLogEntry>, AuditError>;
}
