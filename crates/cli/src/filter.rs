use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Args;

use finadmin_audit::{ActionType, AuditLogFilter};

use crate::error::CliError;

/// Filter flags shared by the `audit` subcommands.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Only entries at or after this time (RFC 3339 or YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<String>,
    /// Only entries at or before this time. A bare date covers the whole day.
    #[arg(long)]
    pub end: Option<String>,
    /// Filter by acting admin user id.
    #[arg(long)]
    pub admin: Option<String>,
    /// Filter by affected table.
    #[arg(long)]
    pub table: Option<String>,
    /// Filter by action type (CREATE, UPDATE, DELETE, REORDER).
    #[arg(long)]
    pub action: Option<ActionType>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<AuditLogFilter, CliError> {
        let mut filter = AuditLogFilter::default();
        if let Some(start) = &self.start {
            filter = filter.since(parse_bound(start, Bound::Start)?);
        }
        if let Some(end) = &self.end {
            filter = filter.until(parse_bound(end, Bound::End)?);
        }
        if let Some(admin) = &self.admin {
            filter = filter.with_admin(admin);
        }
        if let Some(table) = &self.table {
            filter = filter.with_table(table);
        }
        if let Some(action) = self.action {
            filter = filter.with_action(action);
        }
        Ok(filter)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Bound {
    Start,
    End,
}

/// Parse a date flag. A bare date expands to the first or last microsecond
/// of that day in UTC, so both bounds include the whole day.
pub fn parse_bound(value: &str, bound: Bound) -> Result<DateTime<Utc>, CliError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| CliError::InvalidDate(value.to_owned()))?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
            .ok_or_else(|| CliError::InvalidDate(value.to_owned()))?,
    };
    Ok(day.and_time(time).and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn bare_dates_cover_the_whole_day() {
        let start = parse_bound("2026-03-01", Bound::Start).unwrap();
        let end = parse_bound("2026-03-01", Bound::End).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(end.to_rfc3339(), "2026-03-01T23:59:59.999999+00:00");
    }

    #[test]
    fn rfc3339_is_converted_to_utc() {
        let ts = parse_bound("2026-03-01T10:00:00+02:00", Bound::End).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_rejected() {
        for bad in ["yesterday", "2026-13-01", "03/01/2026"] {
            assert!(matches!(
                parse_bound(bad, Bound::Start),
                Err(CliError::InvalidDate(_))
            ));
        }
    }

    #[test]
    fn args_become_filter() {
        let args = FilterArgs {
            start: Some("2026-01-01".into()),
            end: None,
            admin: Some("u1".into()),
            table: Some("achievements".into()),
            action: Some(ActionType::Reorder),
        };
        let filter = args.to_filter().unwrap();
        assert_eq!(
            filter.start_date,
            Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
        );
        assert!(filter.end_date.is_none());
        assert_eq!(filter.admin_user_id.as_deref(), Some("u1"));
        assert_eq!(filter.table_name.as_deref(), Some("achievements"));
        assert_eq!(filter.action_type, Some(ActionType::Reorder));

        assert!(FilterArgs::default().to_filter().unwrap().is_unconstrained());
    }
}
