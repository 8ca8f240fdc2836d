//! Formatting front ends for [`DailyFileLogger`](crate::DailyFileLogger).
//!
//! Each macro takes the logger (anything that derefs to one) followed by
//! `format!`-style arguments and returns the write's `Result`.

/// Append a plain line.
///
/// ```rust,no_run
/// # let logger = dailylog::DailyFileLogger::open("app.log", false, false, true)?;
/// dailylog::log_line!(logger, "{}-{}", "evt", 1)?;
/// # Ok::<(), dailylog::Error>(())
/// ```
#[macro_export]
macro_rules! log_line {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_line(::core::format_args!($($arg)+))
    };
}

/// Append a timestamped `[INFO]` line.
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_info(::core::format_args!($($arg)+))
    };
}

/// Append a timestamped `[ERROR]` line annotated with the caller's file,
/// line and enclosing function, as enabled on the logger.
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_error_at(
            $crate::CallSite::new(
                ::core::file!(),
                ::core::line!(),
                ::core::option::Option::Some($crate::function_name!()),
            ),
            ::core::format_args!($($arg)+),
        )
    };
}
