use std::sync::Arc;

use tracing::{info, warn};

use finadmin_audit::{AuditChange, AuditLogService, BestEffort};
use finadmin_core::CallerContext;

use crate::error::{EditorError, StoreError};
use crate::record::EditorRecord;
use crate::store::RecordStore;

/// Result of a successful mutation.
#[derive(Debug)]
pub struct Mutation<R> {
    /// The record as stored after the mutation (or as it was, for deletes).
    pub record: R,
    /// What happened to the audit entry describing the mutation.
    pub audit: BestEffort,
}

/// Load / validate / mutate / audit cycle over one record collection.
///
/// Holds a copy of the collection that is reloaded wholesale after every
/// successful mutation.
pub struct Editor<R: EditorRecord> {
    store: Arc<dyn RecordStore<R>>,
    audit: AuditLogService,
    records: Vec<R>,
    stale: bool,
}

impl<R: EditorRecord> Editor<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>, audit: AuditLogService) -> Self {
        Self {
            store,
            audit,
            records: Vec::new(),
            stale: true,
        }
    }

    /// Reload the collection from the store.
    pub async fn load(&mut self) -> Result<&[R], EditorError> {
        self.records = self.store.list().await?;
        self.stale = false;
        Ok(&self.records)
    }

    /// The last loaded copy of the collection.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Whether the copy may lag behind the store (never loaded, or the reload
    /// after a mutation failed).
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub async fn create(
        &mut self,
        caller: &CallerContext,
        draft: R,
    ) -> Result<Mutation<R>, EditorError> {
        draft.validate()?;
        let created = self.store.insert(draft).await?;

        let change = AuditChange::created(R::TABLE, created.audit_key(), created.snapshot());
        self.finish(caller, change, created).await
    }

    /// Replace the record stored under `id` with `draft`.
    pub async fn update(
        &mut self,
        caller: &CallerContext,
        id: &str,
        draft: R,
    ) -> Result<Mutation<R>, EditorError> {
        self.revise(caller, id, |_| Ok(draft)).await
    }

    /// Replace the record stored under `id` with the draft `build` derives
    /// from it. Fields the caller leaves unset are taken from the stored
    /// record, never from the loaded copy.
    pub async fn revise<B>(
        &mut self,
        caller: &CallerContext,
        id: &str,
        build: B,
    ) -> Result<Mutation<R>, EditorError>
    where
        B: FnOnce(&R) -> Result<R, EditorError>,
    {
        let before = self.fetch(id).await?;
        let draft = build(&before)?;
        draft.validate()?;
        let after = self.store.update(id, draft).await?;

        let change =
            AuditChange::updated(R::TABLE, after.audit_key(), before.snapshot(), after.snapshot());
        self.finish(caller, change, after).await
    }

    pub async fn delete(&mut self, caller: &CallerContext, id: &str) -> Result<Mutation<R>, EditorError> {
        let removed = self.store.delete(id).await?;

        let change = AuditChange::deleted(R::TABLE, removed.audit_key(), removed.snapshot());
        self.finish(caller, change, removed).await
    }

    /// Apply `edit` to the stored record and log only the fields selected by
    /// `logged`, before and after.
    pub async fn modify<E, L>(
        &mut self,
        caller: &CallerContext,
        id: &str,
        edit: E,
        logged: L,
    ) -> Result<Mutation<R>, EditorError>
    where
        E: FnOnce(&mut R),
        L: Fn(&R) -> serde_json::Value,
    {
        let before = self.fetch(id).await?;
        let mut draft = before.clone();
        edit(&mut draft);
        draft.validate()?;
        let after = self.store.update(id, draft).await?;

        let change = AuditChange::updated(R::TABLE, after.audit_key(), logged(&before), logged(&after));
        self.finish(caller, change, after).await
    }

    /// Store the record under `id` without auditing. Used by multi-record
    /// operations that write one summary entry themselves.
    pub(crate) async fn write_unaudited(&self, id: &str, record: R) -> Result<R, EditorError> {
        Ok(self.store.update(id, record).await?)
    }

    pub(crate) fn audit(&self) -> &AuditLogService {
        &self.audit
    }

    async fn fetch(&self, id: &str) -> Result<R, EditorError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_owned()).into())
    }

    /// Log the change, then reload the collection.
    async fn finish(
        &mut self,
        caller: &CallerContext,
        change: AuditChange,
        record: R,
    ) -> Result<Mutation<R>, EditorError> {
        info!(table = R::TABLE, action = %change.action_type, record_id = %change.record_id, "record mutated");
        let audit = self.audit.log_action(caller, change).await;
        self.refresh().await;
        Ok(Mutation { record, audit })
    }

    /// Reload after a mutation. The mutation already happened, so a failed
    /// reload only marks the copy stale.
    pub(crate) async fn refresh(&mut self) {
        match self.store.list().await {
            Ok(records) => {
                self.records = records;
                self.stale = false;
            }
            Err(e) => {
                warn!(error = %e, table = R::TABLE, "reload after mutation failed");
                self.stale = true;
            }
        }
    }
}
