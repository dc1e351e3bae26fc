use thiserror::Error;

use finadmin_audit::AuditError;

/// Errors that can occur when running the audit log viewer.
#[derive(Debug, Error)]
pub enum CliError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (reading config or seed files, writing exports).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An audit store or export error.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// A `--start`/`--end` value that is neither RFC 3339 nor `YYYY-MM-DD`.
    #[error("invalid date '{0}': expected RFC 3339 or YYYY-MM-DD")]
    InvalidDate(String),
}
