//! # Structured Logging
//!
//! The library only emits `tracing` events: `trace!` for accepted decodes,
//! `debug!` for rejected ones, `warn!` for write-time contract violations.
//! Whoever embeds the codec (a node binary, a test harness) installs the
//! subscriber through [`init_logging`] or [`try_init_logging`].
//!
//! Output goes to stderr so stdout stays free for structured data.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for local development.
    Pretty,
    /// JSON lines for log aggregation.
    Json,
}

impl LogFormat {
    /// Parse a format string. Accepts "json" or "pretty" (case-insensitive).
    /// Returns `Pretty` for any unrecognized value.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Call this exactly once, early in `main()`. Subsequent calls will panic;
/// use [`try_init_logging`] where more than one caller may race to install
/// a subscriber.
///
/// The `RUST_LOG` environment variable overrides `default_level` when set,
/// e.g. `RUST_LOG=confidential_ledger::transaction=trace`.
pub fn init_logging(default_level: &str, format: LogFormat) {
    if let Err(err) = try_init_logging(default_level, format) {
        panic!("tracing subscriber already installed: {err}");
    }
}

/// Fallible variant of [`init_logging`]. Returns an error when a global
/// subscriber is already installed instead of panicking.
pub fn try_init_logging(
    default_level: &str,
    format: LogFormat,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
            .try_init()?,
    }

    tracing::info!("logging initialized (format={:?})", format);
    Ok(())
}
