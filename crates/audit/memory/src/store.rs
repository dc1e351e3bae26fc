use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use finadmin_audit::error::AuditError;
use finadmin_audit::record::{AuditLogEntry, AuditLogFilter, NewAuditLogEntry, SortOrder};
use finadmin_audit::store::AuditStore;

/// In-memory audit store using `DashMap`. Suitable for development, testing,
/// and browsing a previously exported JSON file offline.
pub struct MemoryAuditStore {
    /// Entry ID -> `AuditLogEntry`.
    entries: DashMap<String, AuditLogEntry>,
}

impl MemoryAuditStore {
    /// Create a new empty in-memory audit store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Store a fully formed entry as-is, keeping its `id` and `timestamp`.
    ///
    /// An empty `id` is replaced with a fresh one. An existing entry with the
    /// same `id` is left untouched.
    pub fn import(&self, mut entry: AuditLogEntry) {
        if entry.id.is_empty() {
            entry.id = Uuid::now_v7().to_string();
        }
        self.entries.entry(entry.id.clone()).or_insert(entry);
    }

    /// Import the entries of a JSON export. Returns the number of entries read.
    pub fn load_json(&self, bytes: &[u8]) -> Result<usize, AuditError> {
        let entries: Vec<AuditLogEntry> =
            serde_json::from_slice(bytes).map_err(|e| AuditError::Serialization(e.to_string()))?;
        let n = entries.len();
        for entry in entries {
            self.import(entry);
        }
        Ok(n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collect entries passing `keep`, sorted by timestamp in `order`.
    ///
    /// Ties are broken by `id`.
    fn collect_sorted(
        &self,
        order: SortOrder,
        keep: impl Fn(&AuditLogEntry) -> bool,
    ) -> Vec<AuditLogEntry> {
        let mut matching: Vec<AuditLogEntry> = self
            .entries
            .iter()
            .filter(|e| keep(e.value()))
            .map(|e| e.value().clone())
            .collect();

        matching.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        if order == SortOrder::Descending {
            matching.reverse();
        }
        matching
    }
}

impl Default for MemoryAuditStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn insert(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry, AuditError> {
        let stored = AuditLogEntry {
            id: Uuid::now_v7().to_string(),
            admin_user_id: entry.admin_user_id,
            admin_email: entry.admin_email,
            action_type: entry.action_type,
            table_name: entry.table_name,
            record_id: entry.record_id,
            old_value: entry.old_value,
            new_value: entry.new_value,
            ip_address: None,
            user_agent: entry.user_agent,
            timestamp: Utc::now(),
        };
        self.entries.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn list(
        &self,
        filter: &AuditLogFilter,
        order: SortOrder,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(self
            .collect_sorted(order, |e| filter.matches(e))
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count(&self, filter: &AuditLogFilter) -> Result<u64, AuditError> {
        let n = self
            .entries
            .iter()
            .filter(|e| filter.matches(e.value()))
            .count();
        Ok(n as u64)
    }

    async fn older_than(
        &self,
        threshold: DateTime<Utc>,
        order: SortOrder,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        Ok(self.collect_sorted(order, |e| e.timestamp < threshold))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use serde_json::json;

    use finadmin_audit::record::{ActionType, AuditLogEntry, AuditLogFilter, NewAuditLogEntry, SortOrder};
    use finadmin_audit::store::AuditStore;

    use super::MemoryAuditStore;

    fn make_new(table: &str, action: ActionType) -> NewAuditLogEntry {
        NewAuditLogEntry {
            admin_user_id: "u1".to_owned(),
            admin_email: "ops@example.com".to_owned(),
            action_type: action,
            table_name: table.to_owned(),
            record_id: "1".to_owned(),
            old_value: None,
            new_value: Some(json!({"name": "x"})),
            user_agent: None,
        }
    }

    fn make_entry(id: &str, age: Duration) -> AuditLogEntry {
        AuditLogEntry {
            id: id.to_owned(),
            admin_user_id: "u1".to_owned(),
            admin_email: "ops@example.com".to_owned(),
            action_type: ActionType::Update,
            table_name: "investment_rates".to_owned(),
            record_id: id.to_owned(),
            old_value: Some(json!({"rate_percent": 4.0})),
            new_value: Some(json!({"rate_percent": 4.5})),
            ip_address: None,
            user_agent: None,
            timestamp: Utc::now() - age,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = MemoryAuditStore::new();
        let before = Utc::now();
        let a = store.insert(make_new("achievements", ActionType::Create)).await.unwrap();
        let b = store.insert(make_new("achievements", ActionType::Create)).await.unwrap();

        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert!(a.timestamp >= before);
        assert!(a.ip_address.is_none());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn list_with_filters() {
        let store = MemoryAuditStore::new();
        store.insert(make_new("achievements", ActionType::Create)).await.unwrap();
        store.insert(make_new("admin_emails", ActionType::Delete)).await.unwrap();

        let filter = AuditLogFilter::default().with_table("admin_emails");
        let found = store
            .list(&filter, SortOrder::Descending, 50, 0)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].action_type, ActionType::Delete);
        assert_eq!(store.count(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn list_pagination_newest_first() {
        let store = MemoryAuditStore::new();
        for i in 0..10 {
            store.import(make_entry(&format!("r{i}"), Duration::seconds(i)));
        }

        let page = store
            .list(&AuditLogFilter::default(), SortOrder::Descending, 3, 2)
            .await
            .unwrap();
        let ids: Vec<&str> = page.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["r2", "r3", "r4"]);
        assert_eq!(store.count(&AuditLogFilter::default()).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn list_time_range() {
        let store = MemoryAuditStore::new();
        store.import(make_entry("old", Duration::hours(2)));
        store.import(make_entry("new", Duration::zero()));

        let filter = AuditLogFilter::default().since(Utc::now() - Duration::hours(1));
        let found = store
            .list(&filter, SortOrder::Descending, 50, 0)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "new");
    }

    #[tokio::test]
    async fn older_than_is_strict_and_ordered() {
        let store = MemoryAuditStore::new();
        let threshold = Utc::now() - Duration::days(1);

        let mut at = make_entry("at", Duration::zero());
        at.timestamp = threshold;
        store.import(at);
        store.import(make_entry("older", Duration::days(3)));
        store.import(make_entry("old", Duration::days(2)));

        let found = store
            .older_than(threshold, SortOrder::Ascending)
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["older", "old"]);
    }

    #[tokio::test]
    async fn import_keeps_existing_entry() {
        let store = MemoryAuditStore::new();
        store.import(make_entry("r1", Duration::zero()));
        let mut dup = make_entry("r1", Duration::zero());
        dup.record_id = "other".to_owned();
        store.import(dup);

        assert_eq!(store.len(), 1);
        let all = store
            .list(&AuditLogFilter::default(), SortOrder::Descending, 10, 0)
            .await
            .unwrap();
        assert_eq!(all[0].record_id, "r1");
    }

    #[tokio::test]
    async fn load_json_export() {
        let store = MemoryAuditStore::new();
        let entries = vec![make_entry("a", Duration::zero()), make_entry("b", Duration::days(1))];
        let bytes = serde_json::to_vec_pretty(&entries).unwrap();

        assert_eq!(store.load_json(&bytes).unwrap(), 2);
        assert_eq!(store.len(), 2);
        assert!(store.load_json(b"{not json").is_err());
    }
}
