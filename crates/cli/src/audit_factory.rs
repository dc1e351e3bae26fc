use std::sync::Arc;

use tracing::info;

use finadmin_audit::AuditStore;
use finadmin_audit_memory::MemoryAuditStore;
#[cfg(feature = "postgres")]
use finadmin_audit_postgres::{PostgresAuditConfig, PostgresAuditStore};

use crate::config::AuditConfig;
use crate::error::CliError;

/// Create an audit store from the given configuration.
#[allow(clippy::unused_async)]
pub async fn create_audit_store(config: &AuditConfig) -> Result<Arc<dyn AuditStore>, CliError> {
    let store: Arc<dyn AuditStore> = match config.backend.as_str() {
        "memory" => {
            let store = MemoryAuditStore::new();
            if let Some(path) = &config.seed_path {
                let bytes = std::fs::read(path)?;
                let loaded = store.load_json(&bytes)?;
                info!(count = loaded, path = %path.display(), "audit entries seeded");
            }
            Arc::new(store)
        }
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = config.url.as_deref().ok_or_else(|| {
                CliError::Config("audit postgres backend requires [audit] url".into())
            })?;

            let pg_config = PostgresAuditConfig::new(url)
                .with_table(&config.table)
                .with_max_connections(config.max_connections);

            let store = PostgresAuditStore::new(&pg_config)
                .await
                .map_err(|e| CliError::Config(format!("audit postgres: {e}")))?;

            Arc::new(store)
        }
        other => {
            return Err(CliError::Config(format!(
                "unknown audit backend: {other} (is the feature enabled?)"
            )));
        }
    };

    Ok(store)
}
