// Default value functions referenced by `#[serde(default = "...")]`.

pub fn default_true() -> bool {
    true
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub fn default_logs_path() -> String {
    "./logs".to_string()
}

/// Maximum concurrent sockets (DoS protection)
pub fn default_max_connections() -> usize {
    10_000
}

pub fn default_max_live_queries_per_socket() -> usize {
    1_000
}

pub fn default_live_partition() -> String {
    "live_queries".to_string()
}
