//! Structured logging setup using tracing-subscriber
//!
//! Library code emits `tracing` events (one `info` event per applied mutation,
//! `debug` events for intermediate statistics). The binary installs a
//! subscriber writing to stderr so terminal tables on stdout stay readable.

use anyhow::Result;
use clap::ValueEnum;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Output format of log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Logging configuration derived from CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    pub fn env_filter(&self) -> &'static str {
        if self.verbose {
            "tabprep=debug"
        } else {
            "tabprep=warn"
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(LoggingConfig::default().env_filter(), "tabprep=warn");
        let verbose = LoggingConfig {
            verbose: true,
            format: LogFormat::Json,
        };
        assert_eq!(verbose.env_filter(), "tabprep=debug");
    }
}
