//! # Logging
//!
//! Installs the global `tracing` subscriber.
//!
//! `REP_LOG_FORMAT=json` switches to machine-parseable lines and wins over
//! the config file. `RUST_LOG` wins over both the config filter and
//! `--verbose`. Logs go to stderr so command output on stdout stays clean.

use crate::config::{LogConfig, LogFormat};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "REP_LOG_FORMAT";

const VERBOSE_FILTER: &str = "rep=debug,rep_core=debug";

/// Install the subscriber. Call once, before any command runs.
pub fn init(config: &LogConfig, verbose: bool) {
    let format = std::env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|value| value.parse::<LogFormat>().ok())
        .unwrap_or(config.format);

    let fallback = if verbose {
        VERBOSE_FILTER
    } else {
        config.filter.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
