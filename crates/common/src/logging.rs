//! Logging and tracing initialization.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level`. When `config.file` is
/// set, log lines are appended to that file instead of stderr; if the file
/// cannot be opened, logging falls back to stderr.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let log_file = config.file.as_ref().and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| eprintln!("decal: cannot open log file {}: {e}", path.display()))
            .ok()
    });

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let installed = match (log_file, config.json) {
        (Some(file), true) => tracing::subscriber::set_global_default(
            builder
                .json()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .finish(),
        ),
        (Some(file), false) => tracing::subscriber::set_global_default(
            builder.with_writer(Mutex::new(file)).with_ansi(false).finish(),
        ),
        (None, true) => tracing::subscriber::set_global_default(
            builder.json().with_writer(std::io::stderr).finish(),
        ),
        (None, false) => {
            tracing::subscriber::set_global_default(builder.with_writer(std::io::stderr).finish())
        }
    };
    // A subscriber may already be installed (tests, embedding hosts).
    installed.ok();
}
