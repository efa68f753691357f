use tracing_subscriber::EnvFilter;

use crate::herald_err;
use crate::utils::errors::{HeraldError, HeraldErrorKind};

pub const LOG_ENV: &str = "HERALD_LOG";

/// Installs the global fmt subscriber.
///
/// `HERALD_LOG` takes precedence over `default_filter`.
pub fn init(default_filter: &str) -> Result<(), HeraldError> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| herald_err!(HeraldErrorKind::Config, e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| herald_err!(HeraldErrorKind::Config, e.to_string()))
}
