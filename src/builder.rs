//! Builder for [`DailyFileLogger`].
//!
//! The builder is where a logger's collaborators are chosen: the clock that
//! decides when a day ends and the resolver that turns call sites into
//! annotations. Both default to the real thing.
//!
//! # Example
//!
//! ```rust,no_run
//! use dailylog::{DailyFileLogger, log_error};
//!
//! let logger = DailyFileLogger::builder("logs/app.log")
//!     .with_append(true)
//!     .with_caller_file(true)
//!     .build()
//!     .expect("Failed to open log file");
//!
//! log_error!(logger, "request {} failed", 7).expect("write failed");
//! ```

use std::fmt;
use std::path::PathBuf;

use crate::{
    CallerResolver, Clock, DailyFileLogger, Error, FileLogConfig, LocalClock, Result,
    SiteResolver,
};

/// A builder for configuring and opening a [`DailyFileLogger`].
pub struct LoggerBuilder {
    config: FileLogConfig,
    clock: Box<dyn Clock>,
    resolver: Box<dyn CallerResolver>,
}

impl LoggerBuilder {
    /// Create a builder for `path` with default settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_config(&FileLogConfig::new(path))
    }

    /// Create a builder from an existing configuration.
    pub fn from_config(config: &FileLogConfig) -> Self {
        Self {
            config: config.clone(),
            clock: Box::new(LocalClock),
            resolver: Box::new(SiteResolver),
        }
    }

    /// Append to an existing file instead of truncating it.
    pub fn with_append(mut self, append: bool) -> Self {
        self.config = self.config.with_append(append);
        self
    }

    /// Prefix error records with `<file>:<line>`.
    pub fn with_caller_file(mut self, caller_file: bool) -> Self {
        self.config = self.config.with_caller_file(caller_file);
        self
    }

    /// Prefix error records with the calling function's path.
    ///
    /// Only [`log_error!`](crate::log_error) knows the enclosing function;
    /// records written through [`DailyFileLogger::log_error`] carry the file
    /// and line but no function name.
    pub fn with_caller_function(mut self, caller_function: bool) -> Self {
        self.config = self.config.with_caller_function(caller_function);
        self
    }

    /// Use `clock` for the rotation check and record timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Use `resolver` to annotate error records.
    pub fn with_resolver(mut self, resolver: impl CallerResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// The configuration collected so far.
    pub fn config(&self) -> &FileLogConfig {
        &self.config
    }

    /// Open the logger.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configured path is empty
    /// - The log directory cannot be created
    /// - The log file cannot be created or opened
    pub fn build(self) -> Result<DailyFileLogger> {
        let FileLogConfig {
            path,
            append,
            caller_file,
            caller_function,
        } = self.config;
        if path.as_os_str().is_empty() {
            return Err(Error::Config("log file path is empty".to_string()));
        }
        DailyFileLogger::create(
            path,
            append,
            caller_file,
            caller_function,
            self.clock,
            self.resolver,
        )
    }
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_builder_new() {
        let builder = LoggerBuilder::new("test.log");
        let config = builder.config();
        assert_eq!(config.path, Path::new("test.log"));
        assert!(!config.append);
        assert!(!config.caller_file);
        assert!(!config.caller_function);
    }

    #[test]
    fn test_builder_chaining() {
        let builder = LoggerBuilder::new("app.log")
            .with_append(true)
            .with_caller_file(true)
            .with_caller_function(true);

        let config = builder.config();
        assert!(config.append);
        assert!(config.caller_file);
        assert!(config.caller_function);
    }

    #[test]
    fn test_builder_from_config() {
        let original = FileLogConfig::new("x.log").with_caller_file(true);
        let builder = LoggerBuilder::from_config(&original);
        assert_eq!(builder.config(), &original);
    }

    #[test]
    fn test_builder_debug_shows_config() {
        let builder = LoggerBuilder::new("dbg.log");
        assert!(format!("{builder:?}").contains("dbg.log"));
    }

    #[test]
    fn test_build_rejects_empty_path() {
        let err = LoggerBuilder::new("").build().expect_err("empty path");
        assert!(matches!(err, Error::Config(_)), "{err:?}");
    }

    #[test]
    fn test_from_config_opens_logger() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileLogConfig::new(dir.path().join("cfg.log")).with_append(true);
        let logger = DailyFileLogger::from_config(&config).expect("create logger");
        assert_eq!(logger.path(), dir.path().join("cfg.log"));
        assert!(logger.path().exists());
    }
}
