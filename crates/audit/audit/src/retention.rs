//! Retention boundary detection.
//!
//! Compliance policy archives audit entries after seven years. This module
//! only detects entries close to that boundary; nothing here deletes or
//! archives anything.

use chrono::{DateTime, Duration, Months, Utc};
use serde::Serialize;

use crate::record::AuditLogEntry;

/// Years after which audit entries are due for archival.
pub const RETENTION_YEARS: u32 = 7;

/// Days before the retention boundary at which entries start being flagged.
pub const WARNING_WINDOW_DAYS: i64 = 30;

/// The instant before which entries are flagged: seven calendar years before
/// `now`, plus thirty days.
///
/// Flagged entries include both entries within thirty days of the boundary
/// and entries already past it.
pub fn warning_threshold(now: DateTime<Utc>) -> DateTime<Utc> {
    let cutoff = now
        .checked_sub_months(Months::new(RETENTION_YEARS * 12))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    cutoff + Duration::days(WARNING_WINDOW_DAYS)
}

/// Entries flagged by a retention check, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct RetentionReport {
    /// Threshold the entries were compared against.
    pub threshold: DateTime<Utc>,
    pub entries: Vec<AuditLogEntry>,
}

impl RetentionReport {
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn oldest(&self) -> Option<&AuditLogEntry> {
        self.entries.first()
    }

    /// One-line warning for display, or `None` when nothing is flagged.
    pub fn summary(&self) -> Option<String> {
        match self.count() {
            0 => None,
            1 => Some(format!(
                "1 audit log entry is approaching the {RETENTION_YEARS}-year retention limit"
            )),
            n => Some(format!(
                "{n} audit log entries are approaching the {RETENTION_YEARS}-year retention limit"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn threshold_is_seven_years_minus_thirty_days() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2019, 11, 17, 12, 0, 0).unwrap();
        assert_eq!(warning_threshold(now), expected);
    }

    #[test]
    fn threshold_from_leap_day_clamps_to_month_end() {
        let now = Utc.with_ymd_and_hms(2028, 2, 29, 0, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2021, 2, 28, 0, 0, 0).unwrap() + Duration::days(30);
        assert_eq!(warning_threshold(now), expected);
    }

    #[test]
    fn summary_wording() {
        let report = RetentionReport {
            threshold: Utc::now(),
            entries: Vec::new(),
        };
        assert!(report.summary().is_none());
        assert!(report.oldest().is_none());
    }
}
