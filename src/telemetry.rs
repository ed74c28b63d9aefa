//! Structured logging setup for binaries and tests embedding the engine.

use crate::config::LoggingSettings;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Level used when neither `RUST_LOG` nor the configured level parses
const FALLBACK_LEVEL: &str = "info";

/// Install a global `tracing` subscriber
///
/// `RUST_LOG` wins over the configured level. An unparsable configured level
/// falls back to `info` and is reported with a warning once the subscriber is
/// up. Returns `false` when a subscriber was already installed, so calling
/// this twice is harmless.
pub fn init(settings: &LoggingSettings) -> bool {
    let (filter, rejected) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, None),
        Err(_) => configured_filter(&settings.level),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    let installed = match settings.format.as_str() {
        "pretty" => subscriber.pretty().try_init(),
        "compact" => subscriber.compact().try_init(),
        _ => subscriber.json().try_init(),
    };

    if let Some(err) = rejected {
        tracing::warn!(level = %settings.level, error = %err, "invalid logging.level, using {FALLBACK_LEVEL}");
    }

    installed.is_ok()
}

fn configured_filter(level: &str) -> (EnvFilter, Option<ParseError>) {
    match EnvFilter::try_new(level) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new(FALLBACK_LEVEL), Some(err)),
    }
}
