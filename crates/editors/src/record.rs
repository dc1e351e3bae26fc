use std::cmp::Ordering;

use serde::Serialize;

use finadmin_core::{Achievement, AdminEmail, InvestmentRate, SystemSetting, ValidationRule};

use crate::error::ValidationError;
use crate::validate::{check_email, check_range, require};

/// Points an achievement may award.
pub const MAX_ACHIEVEMENT_POINTS: i64 = 10_000;

/// A record type an [`Editor`](crate::Editor) can manage.
pub trait EditorRecord: Clone + Serialize + Send + Sync + 'static {
    /// Collection name, also written to the audit trail.
    const TABLE: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Identifier written to the audit trail. Defaults to the record id.
    fn audit_key(&self) -> String {
        self.id().to_owned()
    }

    /// Value that must be unique across the collection, if any.
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Field checks run before any store call.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Order in which the store lists the collection.
    fn display_cmp(&self, other: &Self) -> Ordering;

    /// Snapshot of the record for the audit trail.
    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl EditorRecord for Achievement {
    const TABLE: &'static str = Achievement::TABLE;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        check_range("points", self.points, 0, MAX_ACHIEVEMENT_POINTS)?;
        if !self.criteria.is_object() {
            return Err(ValidationError::NotAnObject("criteria"));
        }
        Ok(())
    }

    fn display_cmp(&self, other: &Self) -> Ordering {
        self.display_order
            .cmp(&other.display_order)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl EditorRecord for AdminEmail {
    const TABLE: &'static str = AdminEmail::TABLE;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn audit_key(&self) -> String {
        self.email.clone()
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("email", &self.email)?;
        check_email(&self.email)
    }

    fn display_cmp(&self, other: &Self) -> Ordering {
        self.email.cmp(&other.email)
    }
}

impl EditorRecord for InvestmentRate {
    const TABLE: &'static str = InvestmentRate::TABLE;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}-Q{}", self.year, self.quarter))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_range("year", self.year, 2000, 2100)?;
        check_range("quarter", self.quarter, 1, 4)?;
        check_range("rate_percent", self.rate_percent, 0.0, 100.0)
    }

    /// Newest period first.
    fn display_cmp(&self, other: &Self) -> Ordering {
        other
            .year
            .cmp(&self.year)
            .then_with(|| other.quarter.cmp(&self.quarter))
    }
}

impl EditorRecord for SystemSetting {
    const TABLE: &'static str = SystemSetting::TABLE;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.key.clone())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("key", &self.key)
    }

    fn display_cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl EditorRecord for ValidationRule {
    const TABLE: &'static str = ValidationRule::TABLE;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.rule_name.clone())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("rule_name", &self.rule_name)?;
        require("rule_type", &self.rule_type)
    }

    fn display_cmp(&self, other: &Self) -> Ordering {
        self.rule_name.cmp(&other.rule_name)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn rate(year: i32, quarter: u8, rate_percent: f64) -> InvestmentRate {
        InvestmentRate {
            id: String::new(),
            year,
            quarter,
            rate_percent,
            effective_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn achievement_validation() {
        let mut a: Achievement = serde_json::from_value(json!({"name": "Saver"})).unwrap();
        assert!(a.validate().is_ok());

        a.points = -1;
        assert!(matches!(
            a.validate(),
            Err(ValidationError::OutOfRange { field: "points", .. })
        ));

        a.points = 10;
        a.criteria = json!("deposit 3 times");
        assert_eq!(a.validate(), Err(ValidationError::NotAnObject("criteria")));

        a.criteria = json!({});
        a.name = " ".into();
        assert_eq!(a.validate(), Err(ValidationError::Required("name")));
    }

    #[test]
    fn rate_validation() {
        assert!(rate(2026, 1, 4.25).validate().is_ok());
        assert!(rate(2026, 5, 4.25).validate().is_err());
        assert!(rate(2026, 1, 100.5).validate().is_err());
        assert!(rate(1999, 1, 1.0).validate().is_err());
    }

    #[test]
    fn rates_list_newest_first() {
        let mut rates = vec![rate(2025, 4, 1.0), rate(2026, 1, 1.0), rate(2026, 2, 1.0)];
        rates.sort_by(EditorRecord::display_cmp);
        let periods: Vec<String> = rates.iter().filter_map(EditorRecord::unique_key).collect();
        assert_eq!(periods, ["2026-Q2", "2026-Q1", "2025-Q4"]);
    }

    #[test]
    fn admin_email_audits_by_address() {
        let email = AdminEmail {
            id: "row-7".into(),
            email: "ops@example.com".into(),
            is_active: true,
            added_by: None,
            created_at: None,
        };
        assert_eq!(email.audit_key(), "ops@example.com");
        assert_eq!(email.snapshot()["email"], json!("ops@example.com"));
    }
}
