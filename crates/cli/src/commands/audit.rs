use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde_json::json;

use finadmin_audit::{AuditLogEntry, AuditLogService, AuditPage, ExportFormat, RetentionReport};

use crate::OutputFormat;
use crate::error::CliError;
use crate::filter::{Bound, FilterArgs, parse_bound};

#[derive(Args, Debug)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub command: AuditCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// List audit entries, newest first.
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Maximum entries to return.
        #[arg(long, default_value = "50")]
        limit: u64,
        /// Entries to skip.
        #[arg(long, default_value = "0")]
        offset: u64,
    },
    /// Count matching audit entries.
    Count {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Export matching entries (at most 10,000) as JSON or CSV.
    Export {
        /// Export format: json or csv.
        format: ExportFormat,
        /// Directory to write into. Defaults to `[export] output_dir`.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show entries approaching the 7-year retention limit.
    Retention {
        /// Evaluate as of this time instead of now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Show the most recent activity.
    Recent {
        #[arg(long, default_value = "10")]
        limit: u64,
    },
}

pub async fn run(
    audit: &AuditLogService,
    args: &AuditArgs,
    format: &OutputFormat,
    default_out_dir: &Path,
) -> Result<(), CliError> {
    match &args.command {
        AuditCommand::List {
            filter,
            limit,
            offset,
        } => {
            let page = audit
                .get_audit_page(&filter.to_filter()?, *limit, *offset)
                .await?;
            print_page(&page, format)
        }
        AuditCommand::Count { filter } => {
            let total = audit.get_audit_log_count(&filter.to_filter()?).await?;
            match format {
                OutputFormat::Json => println!("{}", json!({ "total": total })),
                OutputFormat::Text => println!("{total}"),
            }
            Ok(())
        }
        AuditCommand::Export {
            format: export_format,
            out_dir,
            filter,
        } => {
            let artifact = audit
                .export_audit_logs(&filter.to_filter()?, *export_format)
                .await?;
            let dir = out_dir.as_deref().unwrap_or(default_out_dir);
            let path = write_artifact(dir, &artifact.filename, &artifact.bytes)?;
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    json!({
                        "path": path.display().to_string(),
                        "content_type": artifact.content_type,
                        "bytes": artifact.bytes.len(),
                    })
                ),
                OutputFormat::Text => {
                    println!("Wrote {} ({} bytes)", path.display(), artifact.bytes.len());
                }
            }
            Ok(())
        }
        AuditCommand::Retention { at } => {
            let now: DateTime<Utc> = match at {
                Some(at) => parse_bound(at, Bound::Start)?,
                None => Utc::now(),
            };
            let report = audit.get_retention_report_at(now).await?;
            print_retention(&report, format)
        }
        AuditCommand::Recent { limit } => {
            let entries = audit.get_recent_activity(*limit).await?;
            match format {
                OutputFormat::Json => print_json(&entries),
                OutputFormat::Text => {
                    if entries.is_empty() {
                        println!("No recent activity.");
                    }
                    for entry in &entries {
                        println!("  {}", entry_line(entry));
                    }
                    Ok(())
                }
            }
        }
    }
}

fn print_page(page: &AuditPage, format: &OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => print_json(page),
        OutputFormat::Text => {
            println!(
                "Total: {} entries (showing {}, page {} of {})",
                page.total,
                page.entries.len(),
                current_page(page),
                page.page_count()
            );
            for entry in &page.entries {
                println!("  {}", entry_line(entry));
            }
            Ok(())
        }
    }
}

fn print_retention(report: &RetentionReport, format: &OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Text => {
            match report.summary() {
                Some(summary) => println!("{summary} (older than {})", report.threshold),
                None => println!("No entries are approaching the retention limit."),
            }
            for entry in &report.entries {
                println!("  {}", entry_line(entry));
            }
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| finadmin_audit::AuditError::Serialization(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}

/// One-based page number of `page` within the full result set.
fn current_page(page: &AuditPage) -> u64 {
    if page.limit == 0 {
        0
    } else {
        page.offset / page.limit + 1
    }
}

/// Single-line text rendering of an entry.
fn entry_line(entry: &AuditLogEntry) -> String {
    format!(
        "[{ts}] {action:<7} {table}/{record} by {email}",
        ts = entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        action = entry.action_type.as_str(),
        table = entry.table_name,
        record = entry.record_id,
        email = entry.admin_email,
    )
}

fn write_artifact(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, CliError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes)?;
    Ok(path)
}
