use tracing_subscriber::EnvFilter;

use crate::error::LabError;

/// Installs a console subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) -> Result<(), LabError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| LabError::Logging(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| LabError::Logging(e.to_string()))
}
