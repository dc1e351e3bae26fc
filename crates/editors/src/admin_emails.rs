use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use finadmin_audit::AuditLogService;
use finadmin_core::{AdminEmail, CallerContext};

use crate::editor::{Editor, Mutation};
use crate::error::{EditorError, StoreError};
use crate::store::RecordStore;
use crate::validate::normalize_email;

/// Editor for the list of addresses allowed into the admin console.
///
/// Audit entries use the address itself as `record_id`. The last active
/// address can be neither deactivated nor removed.
pub struct AdminEmailEditor {
    inner: Editor<AdminEmail>,
}

impl AdminEmailEditor {
    pub fn new(store: Arc<dyn RecordStore<AdminEmail>>, audit: AuditLogService) -> Self {
        Self {
            inner: Editor::new(store, audit),
        }
    }

    pub async fn load(&mut self) -> Result<&[AdminEmail], EditorError> {
        self.inner.load().await
    }

    pub fn records(&self) -> &[AdminEmail] {
        self.inner.records()
    }

    pub fn is_stale(&self) -> bool {
        self.inner.is_stale()
    }

    /// Grant access to `email`, recording the caller as the granter.
    pub async fn add(
        &mut self,
        caller: &CallerContext,
        email: &str,
    ) -> Result<Mutation<AdminEmail>, EditorError> {
        let record = AdminEmail {
            id: String::new(),
            email: normalize_email(email),
            is_active: true,
            added_by: caller.principal.as_ref().map(|p| p.email.clone()),
            created_at: Some(Utc::now()),
        };
        self.inner.create(caller, record).await
    }

    /// Flip `is_active`. Only that field is logged.
    pub async fn toggle_active(
        &mut self,
        caller: &CallerContext,
        id: &str,
    ) -> Result<Mutation<AdminEmail>, EditorError> {
        self.guard_last_active(id).await?;
        self.inner
            .modify(
                caller,
                id,
                |e| e.is_active = !e.is_active,
                |e| json!({ "is_active": e.is_active }),
            )
            .await
    }

    pub async fn remove(
        &mut self,
        caller: &CallerContext,
        id: &str,
    ) -> Result<Mutation<AdminEmail>, EditorError> {
        self.guard_last_active(id).await?;
        self.inner.delete(caller, id).await
    }

    /// Fail when `id` is the only active address left.
    async fn guard_last_active(&mut self, id: &str) -> Result<(), EditorError> {
        let all = self.inner.load().await?;
        let target = all
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        if !target.is_active {
            return Ok(());
        }

        let active = all.iter().filter(|e| e.is_active).count();
        if active <= 1 {
            return Err(EditorError::LastActiveAdmin);
        }
        Ok(())
    }
}
