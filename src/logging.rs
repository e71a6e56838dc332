//! Process-wide tracing setup.

use tracing_subscriber::{fmt, EnvFilter};

use crate::types::{Result, SlotError};

/// Installs a `fmt` subscriber filtered by `level` (an `EnvFilter` directive).
pub fn init_logging(level: &str) -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level).map_err(|_| SlotError::Invalid("invalid log level"))?,
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| SlotError::Invalid("logging already initialized"))
}
