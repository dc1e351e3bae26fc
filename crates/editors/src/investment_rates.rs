use std::sync::Arc;

use chrono::NaiveDate;

use finadmin_audit::AuditLogService;
use finadmin_core::{CallerContext, InvestmentRate};

use crate::editor::{Editor, Mutation};
use crate::error::EditorError;
use crate::store::RecordStore;

/// Editor for quarterly investment rates. One rate per year and quarter.
pub struct InvestmentRateEditor {
    inner: Editor<InvestmentRate>,
}

impl InvestmentRateEditor {
    pub fn new(store: Arc<dyn RecordStore<InvestmentRate>>, audit: AuditLogService) -> Self {
        Self {
            inner: Editor::new(store, audit),
        }
    }

    pub async fn load(&mut self) -> Result<&[InvestmentRate], EditorError> {
        self.inner.load().await
    }

    /// Rates, newest period first, as last loaded.
    pub fn records(&self) -> &[InvestmentRate] {
        self.inner.records()
    }

    pub fn is_stale(&self) -> bool {
        self.inner.is_stale()
    }

    pub async fn create(
        &mut self,
        caller: &CallerContext,
        rate: InvestmentRate,
    ) -> Result<Mutation<InvestmentRate>, EditorError> {
        self.inner.create(caller, rate).await
    }

    pub async fn update(
        &mut self,
        caller: &CallerContext,
        id: &str,
        rate: InvestmentRate,
    ) -> Result<Mutation<InvestmentRate>, EditorError> {
        self.inner.update(caller, id, rate).await
    }

    pub async fn delete(
        &mut self,
        caller: &CallerContext,
        id: &str,
    ) -> Result<Mutation<InvestmentRate>, EditorError> {
        self.inner.delete(caller, id).await
    }

    /// The rate in force on `day`: the latest one whose effective date is not
    /// after it.
    pub fn effective_on(&self, day: NaiveDate) -> Option<&InvestmentRate> {
        self.inner
            .records()
            .iter()
            .filter(|r| r.effective_date <= day)
            .max_by_key(|r| r.effective_date)
    }
}
