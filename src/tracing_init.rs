//! Route `tracing` events into a [`DailyFileLogger`].
//!
//! File output goes through `tracing_appender::non_blocking`, so events are
//! written on a worker thread. The logger emits its own rotation diagnostics
//! only after releasing its lock, so a synchronous writer pointed back at it
//! works as well.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;
use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

use crate::{DailyFileLogger, Error, LogConfig, Result};

static LOG_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// A shared logger usable as an owned `io::Write` sink.
#[derive(Debug, Clone)]
pub struct SharedLogger(pub Arc<DailyFileLogger>);

impl Write for SharedLogger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&mut &*self.0).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&mut &*self.0).flush()
    }
}

/// A subscriber built from [`LogConfig`], not yet installed.
///
/// Dropping it flushes pending file output.
pub struct LogSubscriber {
    dispatch: Dispatch,
    logger: Option<Arc<DailyFileLogger>>,
    guard: Option<WorkerGuard>,
}

impl LogSubscriber {
    /// The subscriber, for scoped use with `tracing::dispatcher::with_default`.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// The file logger events are written to, if file output is configured.
    pub fn logger(&self) -> Option<&Arc<DailyFileLogger>> {
        self.logger.as_ref()
    }
}

/// Build a subscriber from the given configuration and optional CLI
/// verbosity override.
pub fn build_subscriber(config: &LogConfig, cli_verbose: Option<u8>) -> Result<LogSubscriber> {
    let log_spec = effective_log_spec(config, cli_verbose);
    let env_filter = EnvFilter::try_new(&log_spec).map_err(|e| Error::Init(e.to_string()))?;

    let console_layer = config.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
    });

    let logger = match &config.file {
        Some(file_config) => Some(Arc::new(DailyFileLogger::from_config(file_config)?)),
        None => None,
    };

    let (file_layer, guard) = match &logger {
        Some(logger) => {
            let (non_blocking, guard) =
                tracing_appender::non_blocking(SharedLogger(Arc::clone(logger)));
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer);

    Ok(LogSubscriber {
        dispatch: Dispatch::new(subscriber),
        logger,
        guard,
    })
}

/// Initialize logging with the given configuration and optional CLI
/// verbosity override.
///
/// Returns the file logger when one is configured, so plain lines can be
/// written next to `tracing` events.
pub fn init_logging(
    config: &LogConfig,
    cli_verbose: Option<u8>,
) -> Result<Option<Arc<DailyFileLogger>>> {
    let LogSubscriber {
        dispatch,
        logger,
        guard,
    } = build_subscriber(config, cli_verbose)?;

    tracing::dispatcher::set_global_default(dispatch).map_err(|e| Error::Init(e.to_string()))?;

    *LOG_GUARD.lock().unwrap_or_else(PoisonError::into_inner) = guard;

    Ok(logger)
}

/// Determine the effective log specification, considering config and CLI overrides.
fn effective_log_spec(config: &LogConfig, cli_verbose: Option<u8>) -> String {
    // RUST_LOG takes precedence over everything
    if let Ok(rust_log) = std::env::var("RUST_LOG")
        && !rust_log.is_empty()
    {
        return rust_log;
    }

    if let Some(verbose) = cli_verbose {
        return match verbose {
            0 => config.level.clone(),
            1 => format!("{},dailylog=debug", config.level),
            2 => format!("{},dailylog=trace", config.level),
            _ => "trace".to_string(),
        };
    }

    if config.level.is_empty() {
        "info".to_string()
    } else {
        config.level.clone()
    }
}
