use tracing_subscriber::{fmt, EnvFilter};

use crate::errors::ConfigError;

/// Installs the global subscriber. `RUST_LOG` wins over the configured filter.
pub fn init_logging(default_filter: &str) -> Result<(), ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter).map_err(|_| ConfigError::Invalid {
            key: "CATALOG_LOG",
            value: default_filter.to_string(),
        })?,
    };

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
    Ok(())
}
