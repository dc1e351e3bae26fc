//! JSON and CSV export of audit entries.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AuditError;
use crate::record::AuditLogEntry;

/// Maximum number of entries included in one export. Matching entries beyond
/// this are left out without notice.
pub const EXPORT_LIMIT: u64 = 10_000;

/// Column headers of the CSV export, in order.
pub const CSV_HEADER: [&str; 7] = [
    "Timestamp",
    "Admin Email",
    "Action Type",
    "Table Name",
    "Record ID",
    "Old Value",
    "New Value",
];

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(AuditError::Serialization(format!(
                "unknown export format: {other}"
            ))),
        }
    }
}

/// A rendered export, ready to be written to disk or sent as a download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// `audit-log-<YYYY-MM-DD>.<ext>`, dated when the export was produced.
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Render `entries` in `format`, naming the file after `exported_on`.
    pub fn render(
        entries: &[AuditLogEntry],
        format: ExportFormat,
        exported_on: NaiveDate,
    ) -> Result<Self, AuditError> {
        let bytes = match format {
            ExportFormat::Json => to_json(entries)?,
            ExportFormat::Csv => to_csv(entries)?,
        };
        Ok(Self {
            filename: export_filename(format, exported_on),
            content_type: format.content_type(),
            bytes,
        })
    }
}

pub fn export_filename(format: ExportFormat, exported_on: NaiveDate) -> String {
    format!("audit-log-{}.{}", exported_on.format("%Y-%m-%d"), format.extension())
}

/// Pretty-printed JSON array of entries.
pub fn to_json(entries: &[AuditLogEntry]) -> Result<Vec<u8>, AuditError> {
    serde_json::to_vec_pretty(entries).map_err(|e| AuditError::Serialization(e.to_string()))
}

/// CSV with an unquoted header line and one fully quoted row per entry.
///
/// Snapshots are embedded as compact JSON, `{}` when absent. Lines are
/// separated by `\n` with no trailing newline; newlines inside a quoted
/// field are kept as-is.
pub fn to_csv(entries: &[AuditLogEntry]) -> Result<Vec<u8>, AuditError> {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(CSV_HEADER.join(","));

    for entry in entries {
        let cells = [
            entry.timestamp.to_rfc3339(),
            entry.admin_email.clone(),
            entry.action_type.to_string(),
            entry.table_name.clone(),
            entry.record_id.clone(),
            snapshot_json(entry.old_value.as_ref())?,
            snapshot_json(entry.new_value.as_ref())?,
        ];
        let row: Vec<String> = cells.iter().map(|c| quote_csv(c)).collect();
        lines.push(row.join(","));
    }

    Ok(lines.join("\n").into_bytes())
}

fn snapshot_json(value: Option<&serde_json::Value>) -> Result<String, AuditError> {
    match value {
        Some(v) => serde_json::to_string(v).map_err(|e| AuditError::Serialization(e.to_string())),
        None => Ok("{}".to_owned()),
    }
}

/// Wrap a field in double quotes, doubling any embedded quote.
fn quote_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
