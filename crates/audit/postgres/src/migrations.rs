use sqlx::PgPool;

/// Run the audit table migration, creating the table and indexes if they do
/// not already exist.
pub async fn run_migrations(pool: &PgPool, table: &str) -> Result<(), sqlx::Error> {
    let create_table = format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            admin_user_id   TEXT NOT NULL,
            admin_email     TEXT NOT NULL,
            action_type     TEXT NOT NULL
                CHECK (action_type IN ('CREATE', 'UPDATE', 'DELETE', 'REORDER')),
            table_name      TEXT NOT NULL CHECK (table_name <> ''),
            record_id       TEXT NOT NULL,
            old_value       JSONB,
            new_value       JSONB,
            ip_address      TEXT,
            user_agent      TEXT,
            timestamp       TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "
    );

    sqlx::query(&create_table).execute(pool).await?;

    let indexes = [
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_time ON {table} (timestamp DESC)"),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_admin ON {table} (admin_user_id, timestamp DESC)"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_table ON {table} (table_name, timestamp DESC)"
        ),
    ];

    for idx in &indexes {
        sqlx::query(idx).execute(pool).await?;
    }

    Ok(())
}
