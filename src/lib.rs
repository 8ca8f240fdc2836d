//! # Dailylog
//!
//! A small file logger that rotates its file once per calendar day.
//!
//! ## Features
//!
//! - Plain, `[INFO]` and `[ERROR]` records appended to one file
//! - Lazy daily rotation: the first write on a new local date moves the file
//!   to `<path>.<yesterday>` and starts a fresh one
//! - Optional `<file>:<line>` and function annotations on error records
//! - Safe to share between threads; lines never interleave
//! - Can back a `tracing` subscriber (`subscriber` feature)
//!
//! ## Example
//!
//! ```rust,no_run
//! use dailylog::{DailyFileLogger, log_error, log_line};
//!
//! let logger = DailyFileLogger::open("logs/app.log", true, true, true)?;
//!
//! log_line!(logger, "{}-{}", "evt", 1)?;
//! log_error!(logger, "disk {} is full", "/dev/sda1")?;
//! # Ok::<(), dailylog::Error>(())
//! ```

pub mod builder;
pub mod caller;
pub mod clock;
pub mod config;
pub mod error;
pub mod logger;
mod macros;
pub mod rotation;

#[cfg(feature = "subscriber")]
pub mod tracing_init;

pub use builder::LoggerBuilder;
pub use caller::{CallSite, Caller, CallerResolver, FixedCaller, SiteResolver, Unresolved};
pub use clock::{Clock, LocalClock, ManualClock};
pub use config::{FileLogConfig, LogConfig};
pub use error::{Error, Result};
pub use logger::DailyFileLogger;

#[cfg(feature = "subscriber")]
pub use tracing_init::init_logging;
