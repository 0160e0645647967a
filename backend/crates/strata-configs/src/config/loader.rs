use super::types::ServerConfig;
use std::fs;
use std::path::Path;

const VALID_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const VALID_FORMATS: [&str; 2] = ["compact", "json"];

impl ServerConfig {
    /// Load configuration from a TOML file, apply environment overrides and
    /// validate the result.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides()?;
        config.finalize()?;

        Ok(config)
    }

    /// Parse configuration from TOML text without validating it.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))
    }

    /// Override settings from environment variables.
    ///
    /// Supported environment variables:
    /// - STRATA_LOG_LEVEL: Override logging.level
    /// - STRATA_LOG_FORMAT: Override logging.format
    /// - STRATA_LOG_TO_CONSOLE: Override logging.log_to_console
    /// - STRATA_MAX_CONNECTIONS: Override live.max_connections
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    pub(crate) fn apply_overrides_from<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("STRATA_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Some(format) = lookup("STRATA_LOG_FORMAT") {
            self.logging.format = format.to_lowercase();
        }

        if let Some(val) = lookup("STRATA_LOG_TO_CONSOLE") {
            let val = val.to_lowercase();
            self.logging.log_to_console = val == "true" || val == "1" || val == "yes";
        }

        if let Some(max) = lookup("STRATA_MAX_CONNECTIONS") {
            self.live.max_connections = max
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid STRATA_MAX_CONNECTIONS value: {}", max))?;
        }

        Ok(())
    }

    /// Validate configuration. Call this after applying environment overrides.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.validate()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                VALID_LEVELS.join(", ")
            ));
        }

        if !VALID_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                VALID_FORMATS.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    VALID_LEVELS.join(", ")
                ));
            }
        }

        if self.live.max_connections == 0 {
            return Err(anyhow::anyhow!("live.max_connections cannot be 0"));
        }

        if self.live.max_live_queries_per_socket == 0 {
            return Err(anyhow::anyhow!("live.max_live_queries_per_socket cannot be 0"));
        }

        if self.live.partition.trim().is_empty() {
            return Err(anyhow::anyhow!("live.partition cannot be empty"));
        }

        Ok(())
    }
}
