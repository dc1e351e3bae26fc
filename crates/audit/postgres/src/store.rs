use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;

use finadmin_audit::error::AuditError;
use finadmin_audit::record::{AuditLogEntry, AuditLogFilter, NewAuditLogEntry, SortOrder};
use finadmin_audit::store::AuditStore;

use crate::config::PostgresAuditConfig;
use crate::migrations;

/// Postgres-backed audit store using `sqlx`.
pub struct PostgresAuditStore {
    pool: PgPool,
    table: String,
}

impl PostgresAuditStore {
    /// Create a new store, connecting to Postgres and running migrations.
    pub async fn new(config: &PostgresAuditConfig) -> Result<Self, AuditError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        Self::from_pool(pool, &config.table).await
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: PgPool, table: &str) -> Result<Self, AuditError> {
        migrations::run_migrations(&pool, table)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        Ok(Self {
            pool,
            table: table.to_owned(),
        })
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn insert(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry, AuditError> {
        let sql = format!(
            r"
            INSERT INTO {} (
                admin_user_id, admin_email, action_type, table_name, record_id,
                old_value, new_value, ip_address, user_agent
            ) VALUES (
                $1, $2, $3, $4, $5,
                $6, $7, NULL, $8
            )
            RETURNING *
            ",
            self.table
        );

        let row = sqlx::query_as::<_, AuditRow>(&sql)
            .bind(&entry.admin_user_id)
            .bind(&entry.admin_email)
            .bind(entry.action_type.as_str())
            .bind(&entry.table_name)
            .bind(&entry.record_id)
            .bind(&entry.old_value)
            .bind(&entry.new_value)
            .bind(&entry.user_agent)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        row.try_into()
    }

    async fn list(
        &self,
        filter: &AuditLogFilter,
        order: SortOrder,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        let clause = build_where_clause(filter);
        let limit_idx = clause.next_idx;
        let offset_idx = clause.next_idx + 1;
        let direction = sql_direction(order);
        let sql = format!(
            "SELECT * FROM {} {} ORDER BY timestamp {direction}, id {direction} LIMIT ${limit_idx} OFFSET ${offset_idx}",
            self.table, clause.sql
        );

        let mut q = sqlx::query_as::<_, AuditRow>(&sql);
        for b in &clause.binds {
            q = match b {
                BindValue::Text(v) => q.bind(v),
                BindValue::Time(v) => q.bind(v),
            };
        }
        q = q.bind(saturating_i64(limit));
        q = q.bind(saturating_i64(offset));

        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        debug!(count = rows.len(), "audit entries fetched");
        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }

    async fn count(&self, filter: &AuditLogFilter) -> Result<u64, AuditError> {
        let clause = build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) AS cnt FROM {} {}", self.table, clause.sql);

        let mut q = sqlx::query_scalar::<_, i64>(&sql);
        for b in &clause.binds {
            q = match b {
                BindValue::Text(v) => q.bind(v),
                BindValue::Time(v) => q.bind(v),
            };
        }

        let total = q
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        #[allow(clippy::cast_sign_loss)]
        let total = total as u64;
        Ok(total)
    }

    async fn older_than(
        &self,
        threshold: DateTime<Utc>,
        order: SortOrder,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        let direction = sql_direction(order);
        let sql = format!(
            "SELECT * FROM {} WHERE timestamp < $1 ORDER BY timestamp {direction}, id {direction}",
            self.table
        );

        let rows = sqlx::query_as::<_, AuditRow>(&sql)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }
}

fn sql_direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Ascending => "ASC",
        SortOrder::Descending => "DESC",
    }
}

fn saturating_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// A positional parameter value for a filtered query.
#[derive(Debug, PartialEq)]
enum BindValue {
    Text(String),
    Time(DateTime<Utc>),
}

/// A `WHERE` clause with its bind values in positional order.
#[derive(Debug)]
struct WhereClause {
    sql: String,
    binds: Vec<BindValue>,
    /// Index of the next free positional parameter.
    next_idx: usize,
}

/// Build the WHERE clause shared by `list` and `count`.
fn build_where_clause(filter: &AuditLogFilter) -> WhereClause {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    let fields: [(Option<&str>, &str); 3] = [
        (filter.admin_user_id.as_deref(), "admin_user_id"),
        (filter.table_name.as_deref(), "table_name"),
        (filter.action_type.map(|a| a.as_str()), "action_type"),
    ];

    for (value, col) in fields {
        if let Some(v) = value {
            binds.push(BindValue::Text(v.to_owned()));
            conditions.push(format!("{col} = ${}", binds.len()));
        }
    }

    if let Some(start) = filter.start_date {
        binds.push(BindValue::Time(start));
        conditions.push(format!("timestamp >= ${}", binds.len()));
    }

    if let Some(end) = filter.end_date {
        binds.push(BindValue::Time(end));
        conditions.push(format!("timestamp <= ${}", binds.len()));
    }

    let sql = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    WhereClause {
        sql,
        next_idx: binds.len() + 1,
        binds,
    }
}

/// Internal row type for mapping database rows to `AuditLogEntry`.
#[derive(sqlx::FromRow)]
struct AuditRow {
    id: uuid::Uuid,
    admin_user_id: String,
    admin_email: String,
    action_type: String,
    table_name: String,
    record_id: String,
    old_value: Option<serde_json::Value>,
    new_value: Option<serde_json::Value>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    timestamp: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditLogEntry {
    type Error = AuditError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.to_string(),
            admin_user_id: row.admin_user_id,
            admin_email: row.admin_email,
            action_type: row.action_type.parse()?,
            table_name: row.table_name,
            record_id: row.record_id,
            old_value: row.old_value.filter(|v| !v.is_null()),
            new_value: row.new_value.filter(|v| !v.is_null()),
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            timestamp: row.timestamp,
        })
    }
}
