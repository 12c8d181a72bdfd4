//! Logging for Pictor
//!
//! Installs a `tracing-subscriber` registry writing to stderr so that
//! generated output on stdout stays clean

use pictor_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging from configuration
///
/// `log_filter` is a `tracing` filter directive; an unparseable directive
/// falls back to `warn`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &TelemetryConfig, log_filter: &str) -> anyhow::Result<()> {
    let filter = build_filter(log_filter);

    let result = match config.log_format {
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(false);

            tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()
        }
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()
        }
    };

    result.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"))
}
