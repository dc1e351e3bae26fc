use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CliError;

/// Top-level configuration loaded from `finadmin.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl ConsoleConfig {
    /// Read `path`, or fall back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::parse(&contents)
        } else {
            Self::parse("")
        }
    }

    pub fn parse(contents: &str) -> Result<Self, CliError> {
        toml::from_str(contents).map_err(|e| CliError::Config(e.to_string()))
    }
}

/// Log output settings. `RUST_LOG` takes precedence when set.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

/// Configuration for the audit store the viewer reads from.
#[derive(Debug, Deserialize)]
pub struct AuditConfig {
    /// Which backend to use: `"memory"` or `"postgres"`.
    #[serde(default = "default_audit_backend")]
    pub backend: String,
    /// Connection URL (used by `postgres`).
    pub url: Option<String>,
    /// Table holding audit entries (used by `postgres`).
    #[serde(default = "default_audit_table")]
    pub table: String,
    /// Connection pool size (used by `postgres`).
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// JSON export to preload into the `memory` backend.
    pub seed_path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            backend: default_audit_backend(),
            url: None,
            table: default_audit_table(),
            max_connections: default_max_connections(),
            seed_path: None,
        }
    }
}

fn default_audit_backend() -> String {
    "memory".to_owned()
}

fn default_audit_table() -> String {
    "admin_audit_logs".to_owned()
}

fn default_max_connections() -> u32 {
    5
}

/// Where export artifacts are written.
#[derive(Debug, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
