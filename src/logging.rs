use std::fs::File;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::error::{Error, Result};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Where formatted events end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// Appends to a file. Used while the terminal UI owns the screen.
    File(PathBuf),
    Discard,
}

/// Installs the global subscriber. `RUST_LOG` overrides `default_directive`.
///
/// Stdout is never written, so frames and JSON stay clean. The TUI passes
/// `File` or `Discard`, since stderr shares the screen it draws on.
pub fn init_tracing(default_directive: &str, sink: LogSink) -> Result<()> {
    if INITIALISED.get().is_some() {
        return Err(Error::LoggingAlreadyInitialised);
    }

    let (writer, ansi) = match sink {
        LogSink::Stderr => (
            BoxMakeWriter::new(std::io::stderr),
            std::io::stderr().is_terminal(),
        ),
        LogSink::File(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        LogSink::Discard => (BoxMakeWriter::new(std::io::sink), false),
    };

    INITIALISED
        .set(())
        .map_err(|_| Error::LoggingAlreadyInitialised)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(ansi);
    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|_| Error::LoggingAlreadyInitialised)
}
