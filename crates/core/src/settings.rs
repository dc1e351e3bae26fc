use serde::{Deserialize, Serialize};

/// A key/value system configuration entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSetting {
    /// Unique identifier (assigned by the store on creation).
    #[serde(default)]
    pub id: String,
    /// Setting key, unique across settings.
    pub key: String,
    /// Setting value. Any JSON document.
    pub value: serde_json::Value,
    #[serde(default)]
    pub description: Option<String>,
}

impl SystemSetting {
    pub const TABLE: &'static str = "system_settings";
}

/// A validation rule the app applies to user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Unique identifier (assigned by the store on creation).
    #[serde(default)]
    pub id: String,
    pub rule_name: String,
    /// Kind of rule (e.g. `"range"`, `"regex"`, `"required"`).
    pub rule_type: String,
    /// Rule parameters, interpreted according to `rule_type`.
    pub rule_value: serde_json::Value,
    /// Message shown to the user when the rule fails.
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ValidationRule {
    pub const TABLE: &'static str = "validation_rules";
}
