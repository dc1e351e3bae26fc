use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use finadmin_core::CallerContext;

use crate::error::AuditError;
use crate::export::{EXPORT_LIMIT, ExportArtifact, ExportFormat};
use crate::outcome::BestEffort;
use crate::record::{AuditChange, AuditLogEntry, AuditLogFilter, SortOrder};
use crate::retention::{self, RetentionReport};
use crate::store::AuditStore;

/// Records admin mutations and serves them back to the audit log viewer.
#[derive(Clone)]
pub struct AuditLogService {
    store: Arc<dyn AuditStore>,
}

/// One page of the audit log viewer.
#[derive(Debug, Clone, Serialize)]
pub struct AuditPage {
    pub entries: Vec<AuditLogEntry>,
    /// Total number of entries matching the filter (before pagination).
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl AuditPage {
    /// Number of pages of size `limit` needed to show every matching entry.
    pub fn page_count(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.total.div_ceil(self.limit)
        }
    }
}

impl AuditLogService {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    /// Append an audit entry describing `change`, made by `caller`.
    ///
    /// Never fails: without an authenticated principal nothing is written,
    /// and store errors are logged and dropped.
    pub async fn log_action(&self, caller: &CallerContext, change: AuditChange) -> BestEffort {
        let Some(principal) = caller.principal.as_ref() else {
            warn!(
                table = %change.table_name,
                record_id = %change.record_id,
                action = %change.action_type,
                "audit entry skipped: no authenticated principal"
            );
            return BestEffort::Skipped;
        };

        let table = change.table_name.clone();
        let record_id = change.record_id.clone();
        let action = change.action_type;

        let new_entry = match change.into_new_entry(principal, caller.user_agent.clone()) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, %record_id, %action, "audit entry rejected");
                return BestEffort::Dropped(e);
            }
        };

        match self.store.insert(new_entry).await {
            Ok(entry) => {
                debug!(id = %entry.id, %table, %record_id, %action, "audit entry recorded");
                BestEffort::Recorded(entry)
            }
            Err(e) => {
                warn!(error = %e, %table, %record_id, %action, "failed to write audit entry");
                BestEffort::Dropped(e)
            }
        }
    }

    /// Matching entries, newest first, `limit` at a time starting at `offset`.
    pub async fn get_audit_logs(
        &self,
        filter: &AuditLogFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        self.store
            .list(filter, SortOrder::Descending, limit, offset)
            .await
    }

    /// Number of entries matching `filter`.
    pub async fn get_audit_log_count(&self, filter: &AuditLogFilter) -> Result<u64, AuditError> {
        self.store.count(filter).await
    }

    /// Entries and total count for one viewer page.
    pub async fn get_audit_page(
        &self,
        filter: &AuditLogFilter,
        limit: u64,
        offset: u64,
    ) -> Result<AuditPage, AuditError> {
        let entries = self.get_audit_logs(filter, limit, offset).await?;
        let total = self.get_audit_log_count(filter).await?;
        Ok(AuditPage {
            entries,
            total,
            limit,
            offset,
        })
    }

    /// Render up to [`EXPORT_LIMIT`] matching entries, newest first.
    pub async fn export_audit_logs(
        &self,
        filter: &AuditLogFilter,
        format: ExportFormat,
    ) -> Result<ExportArtifact, AuditError> {
        let entries = self.get_audit_logs(filter, EXPORT_LIMIT, 0).await?;
        let artifact = ExportArtifact::render(&entries, format, Utc::now().date_naive())?;
        debug!(
            count = entries.len(),
            %format,
            filename = %artifact.filename,
            "audit log exported"
        );
        Ok(artifact)
    }

    /// Entries older than seven years minus thirty days, oldest first.
    pub async fn get_retention_warnings(&self) -> Result<Vec<AuditLogEntry>, AuditError> {
        self.get_retention_warnings_at(Utc::now()).await
    }

    /// [`get_retention_warnings`](Self::get_retention_warnings) evaluated at `now`.
    pub async fn get_retention_warnings_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        Ok(self.get_retention_report_at(now).await?.entries)
    }

    pub async fn get_retention_report(&self) -> Result<RetentionReport, AuditError> {
        self.get_retention_report_at(Utc::now()).await
    }

    pub async fn get_retention_report_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<RetentionReport, AuditError> {
        let threshold = retention::warning_threshold(now);
        let entries = self
            .store
            .older_than(threshold, SortOrder::Ascending)
            .await?;
        if !entries.is_empty() {
            warn!(
                count = entries.len(),
                %threshold,
                "audit entries approaching retention limit"
            );
        }
        Ok(RetentionReport { threshold, entries })
    }

    /// The `limit` most recent entries, unfiltered.
    pub async fn get_recent_activity(&self, limit: u64) -> Result<Vec<AuditLogEntry>, AuditError> {
        self.get_audit_logs(&AuditLogFilter::default(), limit, 0)
            .await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use finadmin_core::Principal;

    use super::*;
    use crate::record::NewAuditLogEntry;

    /// A store that fails every call.
    struct BrokenStore;

    #[async_trait]
    impl AuditStore for BrokenStore {
        async fn insert(&self, _entry: NewAuditLogEntry) -> Result<AuditLogEntry, AuditError> {
            Err(AuditError::Storage("connection refused".into()))
        }

        async fn list(
            &self,
            _filter: &AuditLogFilter,
            _order: SortOrder,
            _limit: u64,
            _offset: u64,
        ) -> Result<Vec<AuditLogEntry>, AuditError> {
            Err(AuditError::Storage("connection refused".into()))
        }

        async fn count(&self, _filter: &AuditLogFilter) -> Result<u64, AuditError> {
            Err(AuditError::Storage("connection refused".into()))
        }

        async fn older_than(
            &self,
            _threshold: DateTime<Utc>,
            _order: SortOrder,
        ) -> Result<Vec<AuditLogEntry>, AuditError> {
            Err(AuditError::Storage("connection refused".into()))
        }
    }

    fn caller() -> CallerContext {
        CallerContext::authenticated(Principal::new("u1", "ops@example.com"))
    }

    #[tokio::test]
    async fn write_failure_is_dropped_not_raised() {
        let service = AuditLogService::new(Arc::new(BrokenStore));
        let outcome = service
            .log_action(&caller(), AuditChange::created("achievements", "1", json!({})))
            .await;
        assert!(matches!(outcome, BestEffort::Dropped(AuditError::Storage(_))));
        assert!(outcome.entry().is_none());
    }

    #[tokio::test]
    async fn empty_table_name_is_dropped() {
        let service = AuditLogService::new(Arc::new(BrokenStore));
        let outcome = service
            .log_action(&caller(), AuditChange::created("", "1", json!({})))
            .await;
        assert!(matches!(outcome, BestEffort::Dropped(AuditError::InvalidEntry(_))));
    }

    #[tokio::test]
    async fn read_failures_propagate() {
        let service = AuditLogService::new(Arc::new(BrokenStore));
        let filter = AuditLogFilter::default();
        assert!(service.get_audit_logs(&filter, 10, 0).await.is_err());
        assert!(service.get_audit_log_count(&filter).await.is_err());
        assert!(service.get_audit_page(&filter, 10, 0).await.is_err());
        assert!(service
            .export_audit_logs(&filter, ExportFormat::Json)
            .await
            .is_err());
        assert!(service.get_retention_warnings().await.is_err());
        assert!(service.get_recent_activity(5).await.is_err());
    }

    #[test]
    fn page_count_rounds_up() {
        let page = AuditPage {
            entries: Vec::new(),
            total: 41,
            limit: 20,
            offset: 0,
        };
        assert_eq!(page.page_count(), 3);
        let empty = AuditPage { total: 0, ..page.clone() };
        assert_eq!(empty.page_count(), 0);
        let unbounded = AuditPage { limit: 0, ..page };
        assert_eq!(unbounded.page_count(), 0);
    }
}
