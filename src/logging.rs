use crate::error::{ErrorKind, GaiaError};

/// Initialize structured logging with tracing.
/// Call once at application startup; `RUST_LOG` overrides the default `info` filter.
/// Logs go to stderr so stdout stays free for command output.
pub fn init_logging() -> Result<(), GaiaError> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr)
                .json() // JSON output for structured logging
        );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| GaiaError::new(
            ErrorKind::State,
            format!("Failed to set global tracing subscriber: {}", e),
            "startup"
        ))?;

    tracing::info!("Structured logging initialized");
    Ok(())
}
