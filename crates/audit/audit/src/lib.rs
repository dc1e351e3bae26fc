pub mod error;
pub mod export;
pub mod outcome;
pub mod record;
pub mod retention;
pub mod service;
pub mod store;

pub use error::AuditError;
pub use export::{EXPORT_LIMIT, ExportArtifact, ExportFormat};
pub use outcome::BestEffort;
pub use record::{ActionType, AuditChange, AuditLogEntry, AuditLogFilter, NewAuditLogEntry, SortOrder};
pub use retention::RetentionReport;
pub use service::{AuditLogService, AuditPage};
pub use store::AuditStore;
