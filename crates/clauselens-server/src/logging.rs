//! Tracing setup: console output plus an optional plain-text log file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Where console log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    Stdout,
    /// Keeps stdout free for command output.
    Stderr,
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
/// An unopenable log file is reported and skipped.
pub fn init(log_file: Option<&Path>, console: Console) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_writer = match console {
        Console::Stdout => BoxMakeWriter::new(std::io::stdout),
        Console::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    let mut open_error = None;
    let file_layer = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file))),
            Err(e) => {
                open_error = Some(format!("{}: {}", path.display(), e));
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(console_writer))
        .with(file_layer)
        .init();

    if let Some(err) = open_error {
        tracing::warn!("Log file unavailable ({}), logging to console only", err);
    }
}
