//! Structured log output.
//!
//! JSON lines on stderr by default. `RUST_LOG` overrides the configured
//! filter; quiet mode keeps errors only.

use std::fs::OpenOptions;

use nametag_config::{LogFormat, LoggingConfig};
use nametag_paths::NametagPaths;
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "nametag.log";

/// Install the global subscriber with default settings.
pub fn init_logging(quiet: bool) {
    init_logging_with(&LoggingConfig::default(), quiet);
}

/// Run `f` with a default stderr subscriber scoped to the current thread.
///
/// Covers work that happens before the configured subscriber can be
/// installed, such as loading the config that describes it.
pub fn with_bootstrap_logging<T>(quiet: bool, f: impl FnOnce() -> T) -> T {
    let subscriber = tracing_subscriber::registry()
        .with(build_filter(&LoggingConfig::default(), quiet))
        .with(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(false),
        );
    tracing::subscriber::with_default(subscriber, f)
}

/// Install the global subscriber described by `config`.
///
/// Does nothing if a subscriber is already installed.
pub fn init_logging_with(config: &LoggingConfig, quiet: bool) {
    let filter = build_filter(config, quiet);
    let (writer, file_error) = make_writer(config);

    let result = match config.format() {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(writer))
            .try_init(),
    };

    if result.is_ok()
        && let Some(error) = file_error
    {
        tracing::warn!(
            event = "core.logging.file_open_failed",
            error = %error,
            fallback = "stderr"
        );
    }
}

fn build_filter(config: &LoggingConfig, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.filter()))
}

/// Log file writer when requested and openable, stderr otherwise.
fn make_writer(config: &LoggingConfig) -> (BoxMakeWriter, Option<String>) {
    if !config.to_file() {
        return (BoxMakeWriter::new(std::io::stderr), None);
    }

    let opened = NametagPaths::resolve()
        .map_err(|e| e.to_string())
        .and_then(|paths| {
            let dir = paths.logs_dir();
            std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(LOG_FILE_NAME))
                .map_err(|e| e.to_string())
        });

    match opened {
        Ok(file) => (BoxMakeWriter::new(std::sync::Mutex::new(file)), None),
        Err(e) => (BoxMakeWriter::new(std::io::stderr), Some(e)),
    }
}
