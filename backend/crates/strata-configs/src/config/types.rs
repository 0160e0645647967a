use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level server configuration (`server.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub live: LiveQuerySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for log files (default: "./logs")
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Optional per-target log level overrides
    /// [logging.targets]
    /// strata_live = "debug"
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            logs_path: default_logs_path(),
            log_to_console: true,
            format: default_log_format(),
            targets: HashMap::new(),
        }
    }
}

/// Live query subsystem settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveQuerySettings {
    /// Maximum concurrently registered sockets
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Maximum live queries a single socket may own
    #[serde(default = "default_max_live_queries_per_socket")]
    pub max_live_queries_per_socket: usize,

    /// Storage partition holding live query registrations
    #[serde(default = "default_live_partition")]
    pub partition: String,
}

impl Default for LiveQuerySettings {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            max_live_queries_per_socket: default_max_live_queries_per_socket(),
            partition: default_live_partition(),
        }
    }
}
