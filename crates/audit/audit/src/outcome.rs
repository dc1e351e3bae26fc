//! Result of a best-effort audit write.
//!
//! [`AuditLogService::log_action`](crate::AuditLogService::log_action)
//! returns a [`BestEffort`], never a `Result`. An audit failure does not
//! fail the mutation it describes.

use crate::error::AuditError;
use crate::record::AuditLogEntry;

/// What happened to an audit write.
#[derive(Debug)]
pub enum BestEffort {
    /// The entry was persisted.
    Recorded(AuditLogEntry),
    /// No authenticated principal was available; nothing was written.
    Skipped,
    /// The write failed. The error has already been reported to the log.
    Dropped(AuditError),
}

impl BestEffort {
    pub fn is_recorded(&self) -> bool {
        matches!(self, BestEffort::Recorded(_))
    }

    /// The persisted entry, if the write succeeded.
    pub fn entry(&self) -> Option<&AuditLogEntry> {
        match self {
            BestEffort::Recorded(entry) => Some(entry),
            BestEffort::Skipped | BestEffort::Dropped(_) => None,
        }
    }
}
