//! Log setup for the `greenblog` binary.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber: formatted events on stderr, filtered by
/// `RUST_LOG` when set, otherwise by the configured level.
pub fn init(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(format!("greenblog={level},greenblog_core={level},tower_http={level}")),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()?;

    Ok(())
}
