use serde::{Deserialize, Serialize};

/// A badge users can earn in the finance app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    /// Unique identifier (assigned by the store on creation).
    #[serde(default)]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short explanation shown under the badge.
    #[serde(default)]
    pub description: String,
    /// Icon identifier or emoji.
    #[serde(default)]
    pub icon: String,
    /// Grouping used by the app (e.g. `"savings"`, `"streaks"`).
    #[serde(default)]
    pub category: String,
    /// Points awarded when the achievement is earned.
    #[serde(default)]
    pub points: i64,
    /// Free-form unlock criteria evaluated by the app, always a JSON object.
    #[serde(default = "empty_object")]
    pub criteria: serde_json::Value,
    /// Position in the achievements list, ascending.
    #[serde(default)]
    pub display_order: i32,
    /// Inactive achievements are hidden from users.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_active() -> bool {
    true
}

impl Achievement {
    pub const TABLE: &'static str = "achievements";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_applies_defaults() {
        let a: Achievement = serde_json::from_str(r#"{"name":"First Deposit"}"#).unwrap();
        assert!(a.id.is_empty());
        assert!(a.is_active);
        assert_eq!(a.criteria, serde_json::json!({}));
        assert_eq!(a.points, 0);
    }
}
