//! finadmin CLI
//!
//! A command-line viewer for the finadmin console's audit log.

mod audit_factory;
mod commands;
mod config;
mod error;
mod filter;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use finadmin_audit::AuditLogService;

use crate::config::ConsoleConfig;

/// finadmin CLI: view and export the admin audit log.
#[derive(Parser, Debug)]
#[command(name = "finadmin", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "finadmin.toml", global = true)]
    config: PathBuf,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query, export, and check retention of audit entries.
    Audit(commands::audit::AuditArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ConsoleConfig::load(&cli.config)?;

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = audit_factory::create_audit_store(&config.audit).await?;
    let audit = AuditLogService::new(store);

    match cli.command {
        Command::Audit(args) => {
            commands::audit::run(&audit, &args, &cli.format, &config.export.output_dir).await?;
        }
    }
    Ok(())
}
