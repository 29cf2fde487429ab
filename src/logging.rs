//! Process-wide tracing setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;
use crate::{Error, Result};

/// Build the filter: `RUST_LOG` wins when set, otherwise `level`.
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| Error::Config(format!("invalid log level '{}': {}", level, e))),
    }
}

/// Install the global subscriber. Output goes to stderr.
pub fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let filter = build_filter(level)?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    installed.map_err(|e| Error::Other(format!("failed to install tracing subscriber: {}", e)))
}
