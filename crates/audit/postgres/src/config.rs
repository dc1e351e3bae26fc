/// Configuration for the Postgres audit store.
pub struct PostgresAuditConfig {
    /// Postgres connection URL.
    pub url: String,
    /// Name of the audit table.
    pub table: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
}

impl PostgresAuditConfig {
    /// Create a new configuration with the given URL and defaults.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            table: "admin_audit_logs".to_owned(),
            max_connections: 5,
        }
    }

    /// Set the audit table name.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the connection pool size.
    #[must_use]
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}
