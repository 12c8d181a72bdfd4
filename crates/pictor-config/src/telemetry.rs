use serde::Deserialize;

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Output format of log lines
    #[serde(default)]
    pub log_format: LogFormat,
    /// `tracing` filter directive, e.g. `pictor_imagegen=debug`
    #[serde(default)]
    pub log_filter: Option<String>,
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human readable output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}
