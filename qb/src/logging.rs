//! Tracing subscriber setup for the `qb` binary.

use std::{fs::OpenOptions, io, path::Path, sync::Mutex};

use eyre::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level` when set. Logs go to stderr, or are appended
/// to `file` without colors.
pub fn init_logging(level: &str, file: Option<&Path>) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("invalid log level '{level}'"))?,
    };

    let (console_layer, file_layer) = match file {
        Some(path) => {
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(log_file));
            (None, Some(layer))
        }
        None => (Some(fmt::layer().with_target(false).with_writer(io::stderr)), None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .wrap_err("failed to initialise logging")
}
