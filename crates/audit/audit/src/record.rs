use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use finadmin_core::Principal;

use crate::error::AuditError;

/// The kind of mutation an audit entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    Create,
    Update,
    Delete,
    Reorder,
}

impl ActionType {
    pub const ALL: [ActionType; 4] = [
        ActionType::Create,
        ActionType::Update,
        ActionType::Delete,
        ActionType::Reorder,
    ];

    /// Canonical upper-case name, as stored and exported.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Create => "CREATE",
            ActionType::Update => "UPDATE",
            ActionType::Delete => "DELETE",
            ActionType::Reorder => "REORDER",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AuditError::InvalidActionType(s.to_owned()))
    }
}

/// One immutable fact about a past mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Unique identifier, assigned by the store at insert time.
    pub id: String,
    /// Identity of the acting admin, captured at write time.
    pub admin_user_id: String,
    pub admin_email: String,
    pub action_type: ActionType,
    /// Logical record collection affected (e.g. `achievements`).
    pub table_name: String,
    /// Identifier of the affected record. May be a synthetic key such as
    /// an email address.
    pub record_id: String,
    /// State before the mutation. `None` on `CREATE`.
    pub old_value: Option<serde_json::Value>,
    /// State after the mutation. `None` on `DELETE`.
    pub new_value: Option<serde_json::Value>,
    /// Never captured; always `None`.
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// Creation time, assigned by the store.
    pub timestamp: DateTime<Utc>,
}

/// The write shape submitted to an [`AuditStore`](crate::AuditStore).
///
/// Carries neither `id` nor `timestamp`: the store assigns both. There is
/// no `ip_address` either, stores always persist it as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditLogEntry {
    pub admin_user_id: String,
    pub admin_email: String,
    pub action_type: ActionType,
    pub table_name: String,
    pub record_id: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub user_agent: Option<String>,
}

/// A mutation reported by an editor, before the acting identity is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditChange {
    pub action_type: ActionType,
    pub table_name: String,
    pub record_id: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
}

impl AuditChange {
    pub fn new(
        action_type: ActionType,
        table_name: impl Into<String>,
        record_id: impl Into<String>,
        old_value: Option<serde_json::Value>,
        new_value: Option<serde_json::Value>,
    ) -> Self {
        Self {
            action_type,
            table_name: table_name.into(),
            record_id: record_id.into(),
            old_value,
            new_value,
        }
    }

    pub fn created(
        table_name: impl Into<String>,
        record_id: impl Into<String>,
        new_value: serde_json::Value,
    ) -> Self {
        Self::new(ActionType::Create, table_name, record_id, None, Some(new_value))
    }

    pub fn updated(
        table_name: impl Into<String>,
        record_id: impl Into<String>,
        old_value: serde_json::Value,
        new_value: serde_json::Value,
    ) -> Self {
        Self::new(
            ActionType::Update,
            table_name,
            record_id,
            Some(old_value),
            Some(new_value),
        )
    }

    pub fn deleted(
        table_name: impl Into<String>,
        record_id: impl Into<String>,
        old_value: serde_json::Value,
    ) -> Self {
        Self::new(ActionType::Delete, table_name, record_id, Some(old_value), None)
    }

    pub fn reordered(
        table_name: impl Into<String>,
        record_id: impl Into<String>,
        old_value: serde_json::Value,
        new_value: serde_json::Value,
    ) -> Self {
        Self::new(
            ActionType::Reorder,
            table_name,
            record_id,
            Some(old_value),
            Some(new_value),
        )
    }

    /// Attach the acting identity and produce the entry to persist.
    ///
    /// A JSON `null` snapshot is stored as an absent snapshot.
    pub fn into_new_entry(
        self,
        principal: &Principal,
        user_agent: Option<String>,
    ) -> Result<NewAuditLogEntry, AuditError> {
        if self.table_name.trim().is_empty() {
            return Err(AuditError::InvalidEntry("table_name must not be empty".into()));
        }

        Ok(NewAuditLogEntry {
            admin_user_id: principal.id.clone(),
            admin_email: principal.email.clone(),
            action_type: self.action_type,
            table_name: self.table_name,
            record_id: self.record_id,
            old_value: self.old_value.filter(|v| !v.is_null()),
            new_value: self.new_value.filter(|v| !v.is_null()),
            user_agent: user_agent.filter(|ua| !ua.is_empty()),
        })
    }
}

/// Query descriptor for audit entries. Absent fields are unconstrained.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogFilter {
    /// Only entries at or after this time.
    pub start_date: Option<DateTime<Utc>>,
    /// Only entries at or before this time.
    pub end_date: Option<DateTime<Utc>>,
    pub admin_user_id: Option<String>,
    pub table_name: Option<String>,
    pub action_type: Option<ActionType>,
}

impl AuditLogFilter {
    #[must_use]
    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    #[must_use]
    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    #[must_use]
    pub fn with_admin(mut self, admin_user_id: impl Into<String>) -> Self {
        self.admin_user_id = Some(admin_user_id.into());
        self
    }

    #[must_use]
    pub fn with_table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    #[must_use]
    pub fn with_action(mut self, action_type: ActionType) -> Self {
        self.action_type = Some(action_type);
        self
    }

    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `entry` satisfies every present constraint.
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        if self.start_date.is_some_and(|start| entry.timestamp < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| entry.timestamp > end) {
            return false;
        }
        if !matches_filter(self.admin_user_id.as_ref(), &entry.admin_user_id) {
            return false;
        }
        if !matches_filter(self.table_name.as_ref(), &entry.table_name) {
            return false;
        }
        self.action_type.is_none_or(|a| a == entry.action_type)
    }
}

/// Check if a filter matches a value. `None` filter matches everything.
fn matches_filter(filter: Option<&String>, value: &str) -> bool {
    filter.is_none_or(|f| f == value)
}

/// Ordering of results by `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    fn entry(admin: &str, table: &str, action: ActionType, ts: DateTime<Utc>) -> AuditLogEntry {
        AuditLogEntry {
            id: "e1".into(),
            admin_user_id: admin.into(),
            admin_email: format!("{admin}@example.com"),
            action_type: action,
            table_name: table.into(),
            record_id: "1".into(),
            old_value: None,
            new_value: Some(json!({"a": 1})),
            ip_address: None,
            user_agent: None,
            timestamp: ts,
        }
    }

    #[test]
    fn action_type_parses_case_insensitively() {
        assert_eq!("reorder".parse::<ActionType>().unwrap(), ActionType::Reorder);
        assert_eq!(" UPDATE ".parse::<ActionType>().unwrap(), ActionType::Update);
        assert!(matches!(
            "PATCH".parse::<ActionType>(),
            Err(AuditError::InvalidActionType(_))
        ));
    }

    #[test]
    fn action_type_serializes_upper_case() {
        assert_eq!(serde_json::to_value(ActionType::Delete).unwrap(), json!("DELETE"));
        let parsed: ActionType = serde_json::from_value(json!("CREATE")).unwrap();
        assert_eq!(parsed, ActionType::Create);
        assert!(serde_json::from_value::<ActionType>(json!("create")).is_err());
    }

    #[test]
    fn filter_date_bounds_are_inclusive() {
        let now = Utc::now();
        let e = entry("u1", "achievements", ActionType::Create, now);

        assert!(AuditLogFilter::default().since(now).until(now).matches(&e));
        assert!(!AuditLogFilter::default()
            .since(now + Duration::microseconds(1))
            .matches(&e));
        assert!(!AuditLogFilter::default()
            .until(now - Duration::microseconds(1))
            .matches(&e));
    }

    #[test]
    fn filter_equality_fields() {
        let e = entry("u1", "achievements", ActionType::Update, Utc::now());

        assert!(AuditLogFilter::default().matches(&e));
        assert!(AuditLogFilter::default()
            .with_admin("u1")
            .with_table("achievements")
            .with_action(ActionType::Update)
            .matches(&e));
        assert!(!AuditLogFilter::default().with_admin("u2").matches(&e));
        assert!(!AuditLogFilter::default().with_table("admin_emails").matches(&e));
        assert!(!AuditLogFilter::default()
            .with_action(ActionType::Delete)
            .matches(&e));
    }

    #[test]
    fn change_requires_table_name() {
        let principal = Principal::new("u1", "u1@example.com");
        let change = AuditChange::created("  ", "1", json!({}));
        assert!(matches!(
            change.into_new_entry(&principal, None),
            Err(AuditError::InvalidEntry(_))
        ));
    }

    #[test]
    fn change_drops_null_snapshots() {
        let principal = Principal::new("u1", "u1@example.com");
        let change = AuditChange::new(
            ActionType::Update,
            "x",
            "1",
            Some(serde_json::Value::Null),
            Some(json!({"a": 2})),
        );
        let new = change
            .into_new_entry(&principal, Some("agent".into()))
            .unwrap();
        assert_eq!(new.old_value, None);
        assert_eq!(new.new_value, Some(json!({"a": 2})));
        assert_eq!(new.admin_email, "u1@example.com");
        assert_eq!(new.user_agent.as_deref(), Some("agent"));
    }
}
