//! `tracing` setup for applications embedding the purge client.
//!
//! The library crates only emit events; installing a subscriber is up to the
//! host application, which can use [`init`] for the usual setup.

mod config;
mod log_format;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::Config;
pub use log_format::LogFormat;

use tracing_subscriber::{EnvFilter, prelude::*};

/// install the global subscriber, formatting as configured.
///
/// Fails when a global subscriber was already set.
pub fn init(config: &Config) -> anyhow::Result<()> {
    let log_formatter = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    let tracing_registry = tracing_subscriber::registry()
        .with(log_formatter)
        .with(EnvFilter::try_new(&config.filter)?);

    tracing::subscriber::set_global_default(tracing_registry)?;
    Ok(())
}
