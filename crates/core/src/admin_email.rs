use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An email address allowed to sign in to the admin console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminEmail {
    /// Unique identifier (assigned by the store on creation).
    #[serde(default)]
    pub id: String,
    /// Normalized (trimmed, lower-case) email address.
    pub email: String,
    /// Whether the address may currently sign in.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Email of the admin who granted access.
    #[serde(default)]
    pub added_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl AdminEmail {
    pub const TABLE: &'static str = "admin_emails";
}
