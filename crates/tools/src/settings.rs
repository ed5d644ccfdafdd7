//! Tool configuration.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by the registry and the executor.
///
/// Built once at startup and passed by reference.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolSettings {
    /// SQLite database used by `execute_sql`. Required.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Project root advertised to the model.
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,

    /// Operating system name advertised to the model.
    #[serde(default = "default_operating_system")]
    pub operating_system: String,

    /// Upper bound for a single tool invocation.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_operating_system() -> String {
    std::env::consts::OS.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            database_url: None,
            base_path: default_base_path(),
            operating_system: default_operating_system(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ToolSettings {
    /// Default settings pointing `execute_sql` at `database_url`.
    pub fn with_database(database_url: impl Into<String>) -> Self {
        Self {
            database_url: Some(database_url.into()),
            ..Self::default()
        }
    }

    /// Per-invocation timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
