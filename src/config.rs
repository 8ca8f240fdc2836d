use serde::{Deserialize, Serialize};

/// Configuration for logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Enable console logging
    #[serde(default)]
    pub console: bool,
    /// Level filter for the tracing subscriber (e.g., "info", "debug")
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Daily file logging configuration
    pub file: Option<FileLogConfig>,
}

impl LogConfig {
    /// Create a new LogConfig with defaults
    pub fn new() -> Self {
        Self {
            console: false,
            level: default_log_level(),
            file: None,
        }
    }

    /// Enable console logging
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    /// Set log level
    pub fn with_level(mut self, level: String) -> Self {
        self.level = level;
        self
    }

    /// Set file logging configuration
    pub fn with_file(mut self, file: FileLogConfig) -> Self {
        self.file = Some(file);
        self
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration for a daily rotated log file.
///
/// These are the four parameters a [`DailyFileLogger`](crate::DailyFileLogger)
/// is constructed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLogConfig {
    /// Path to the active log file
    pub path: std::path::PathBuf,
    /// Keep existing content when the file already exists
    #[serde(default)]
    pub append: bool,
    /// Prefix error records with `<file>:<line>`
    #[serde(default)]
    pub caller_file: bool,
    /// Prefix error records with the calling function's path
    /// (records written with `log_error!`)
    #[serde(default)]
    pub caller_function: bool,
}

impl FileLogConfig {
    /// Create a new FileLogConfig
    pub fn new<P: Into<std::path::PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            append: false,
            caller_file: false,
            caller_function: false,
        }
    }

    /// Open existing files in append mode instead of truncating them
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Annotate error records with the caller's file and line
    pub fn with_caller_file(mut self, caller_file: bool) -> Self {
        self.caller_file = caller_file;
        self
    }

    /// Annotate error records with the caller's function (`log_error!` only;
    /// the `log_error` method has no function name to print)
    pub fn with_caller_function(mut self, caller_function: bool) -> Self {
        self.caller_function = caller_function;
        self
    }
}
