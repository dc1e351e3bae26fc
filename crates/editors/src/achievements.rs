use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use finadmin_audit::{AuditChange, AuditLogService};
use finadmin_core::{Achievement, CallerContext};

use crate::editor::{Editor, Mutation};
use crate::error::{EditorError, ValidationError};
use crate::store::RecordStore;
use crate::validate::parse_object;

/// Achievement fields as typed into the editor form.
///
/// `criteria` is raw JSON text; blank text means no criteria.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AchievementForm {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub points: i64,
    pub criteria: String,
    /// Position in the list. When absent, a new achievement is appended after
    /// the last one and an edited achievement keeps its stored position.
    pub display_order: Option<i32>,
    /// When absent, new achievements start active and edited ones keep their
    /// stored flag.
    pub is_active: Option<bool>,
}

impl AchievementForm {
    fn into_record(self, order: i32, is_active: bool) -> Result<Achievement, ValidationError> {
        let criteria = if self.criteria.trim().is_empty() {
            json!({})
        } else {
            parse_object("criteria", &self.criteria)?
        };

        Ok(Achievement {
            id: String::new(),
            name: self.name.trim().to_owned(),
            description: self.description,
            icon: self.icon,
            category: self.category,
            points: self.points,
            criteria,
            display_order: self.display_order.unwrap_or(order),
            is_active: self.is_active.unwrap_or(is_active),
        })
    }
}

/// Editor for the achievements collection.
pub struct AchievementEditor {
    inner: Editor<Achievement>,
}

impl AchievementEditor {
    pub fn new(store: Arc<dyn RecordStore<Achievement>>, audit: AuditLogService) -> Self {
        Self {
            inner: Editor::new(store, audit),
        }
    }

    pub async fn load(&mut self) -> Result<&[Achievement], EditorError> {
        self.inner.load().await
    }

    /// Achievements in display order, as last loaded.
    pub fn records(&self) -> &[Achievement] {
        self.inner.records()
    }

    pub fn is_stale(&self) -> bool {
        self.inner.is_stale()
    }

    pub async fn create(
        &mut self,
        caller: &CallerContext,
        form: AchievementForm,
    ) -> Result<Mutation<Achievement>, EditorError> {
        let next_order = self
            .inner
            .records()
            .iter()
            .map(|a| a.display_order)
            .max()
            .map_or(0, |max| max.saturating_add(1));
        let record = form.into_record(next_order, true)?;
        self.inner.create(caller, record).await
    }

    pub async fn update(
        &mut self,
        caller: &CallerContext,
        id: &str,
        form: AchievementForm,
    ) -> Result<Mutation<Achievement>, EditorError> {
        self.inner
            .revise(caller, id, |stored| {
                Ok(form.into_record(stored.display_order, stored.is_active)?)
            })
            .await
    }

    pub async fn delete(
        &mut self,
        caller: &CallerContext,
        id: &str,
    ) -> Result<Mutation<Achievement>, EditorError> {
        self.inner.delete(caller, id).await
    }

    /// Flip `is_active`. Only that field is logged.
    pub async fn toggle_active(
        &mut self,
        caller: &CallerContext,
        id: &str,
    ) -> Result<Mutation<Achievement>, EditorError> {
        self.inner
            .modify(
                caller,
                id,
                |a| a.is_active = !a.is_active,
                |a| json!({ "is_active": a.is_active }),
            )
            .await
    }

    /// Rewrite `display_order` so achievements appear in the order of `ids`.
    ///
    /// `ids` must name every achievement exactly once. A single `REORDER`
    /// entry records the id ordering before and after.
    ///
    /// Positions are written one at a time. If a write fails, the positions
    /// already written stay, nothing is audited, and the loaded copy is
    /// reloaded so it shows the partial order.
    pub async fn reorder(
        &mut self,
        caller: &CallerContext,
        ids: &[String],
    ) -> Result<Mutation<Vec<Achievement>>, EditorError> {
        let current = self.inner.load().await?.to_vec();
        check_permutation(&current, ids)?;

        let before: Vec<&str> = current.iter().map(|a| a.id.as_str()).collect();
        let mut reordered = Vec::with_capacity(ids.len());
        for (position, id) in ids.iter().enumerate() {
            let Some(existing) = current.iter().find(|a| &a.id == id) else {
                continue;
            };
            let order = i32::try_from(position).unwrap_or(i32::MAX);
            if existing.display_order == order {
                reordered.push(existing.clone());
                continue;
            }
            let mut moved = existing.clone();
            moved.display_order = order;
            match self.inner.write_unaudited(id, moved).await {
                Ok(written) => reordered.push(written),
                Err(e) => {
                    warn!(error = %e, written = reordered.len(), "reorder stopped partway");
                    self.inner.refresh().await;
                    return Err(e);
                }
            }
        }

        let change = AuditChange::reordered(
            Achievement::TABLE,
            "display_order",
            json!({ "order": before }),
            json!({ "order": ids }),
        );
        let audit = self.inner.audit().log_action(caller, change).await;
        self.inner.refresh().await;

        Ok(Mutation {
            record: reordered,
            audit,
        })
    }
}

fn check_permutation(current: &[Achievement], ids: &[String]) -> Result<(), ValidationError> {
    let known: HashSet<&str> = current.iter().map(|a| a.id.as_str()).collect();
    let mut seen = HashSet::with_capacity(ids.len());

    for id in ids {
        if !known.contains(id.as_str()) {
            return Err(ValidationError::InvalidOrder(format!("unknown achievement {id}")));
        }
        if !seen.insert(id.as_str()) {
            return Err(ValidationError::InvalidOrder(format!("{id} listed twice")));
        }
    }
    if seen.len() != known.len() {
        return Err(ValidationError::InvalidOrder(format!(
            "expected {} achievements, got {}",
            known.len(),
            seen.len()
        )));
    }
    Ok(())
}
