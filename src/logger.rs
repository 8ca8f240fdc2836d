use std::fmt::{self, Write as _};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use time::{Date, PrimitiveDateTime};

use crate::rotation::{TIMESTAMP_FORMAT, archive_path, fallback_path};
use crate::{CallSite, CallerResolver, Clock, Error, FileLogConfig, LoggerBuilder, Result};

/// Tag written in front of a timestamped record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Info,
    Error,
}

impl Tag {
    fn as_str(self) -> &'static str {
        match self {
            Tag::Info => "[INFO]",
            Tag::Error => "[ERROR]",
        }
    }
}

/// Something worth reporting that happened while the lock was held.
///
/// Collected under the lock and emitted after it is released, so a
/// subscriber writing back into this logger cannot re-enter the lock.
#[derive(Debug)]
enum RotationEvent {
    Rotated { archive: PathBuf, date: Date },
    ArchiveExists { archive: PathBuf },
    ArchiveFailed { archive: PathBuf, error: io::Error },
    Fallback { fallback: PathBuf, error: io::Error },
}

impl RotationEvent {
    fn emit(&self, path: &Path) {
        match self {
            RotationEvent::Rotated { archive, date } => tracing::info!(
                path = %path.display(),
                archive = %archive.display(),
                %date,
                "rotated log file"
            ),
            RotationEvent::ArchiveExists { archive } => tracing::warn!(
                path = %path.display(),
                archive = %archive.display(),
                "archive already exists, keeping log file in place"
            ),
            RotationEvent::ArchiveFailed { archive, error } => tracing::warn!(
                path = %path.display(),
                archive = %archive.display(),
                %error,
                "failed to archive log file, keeping it in place"
            ),
            RotationEvent::Fallback { fallback, error } => tracing::warn!(
                path = %path.display(),
                fallback = %fallback.display(),
                %error,
                "failed to open log file, trying fallback"
            ),
        }
    }
}

/// State of the file currently being written.
#[derive(Debug)]
struct FileState {
    /// `None` only after a rotation failed to open any file.
    file: Option<File>,
    /// Path the handle points at; differs from the logger path on fallback.
    active_path: PathBuf,
    /// Local date the current file was started on.
    start_date: Date,
}

/// A file logger that rotates its file once per calendar day.
///
/// Every write checks the clock. When the local date differs from the date
/// the current file was started on, the file is renamed to
/// `<path>.<yesterday>` and a fresh one is created at `<path>`. The check and
/// the write happen under one lock, so concurrent callers never rotate twice
/// or write into an archived file.
///
/// The logger is `Send + Sync`; share it by reference or in an `Arc`.
pub struct DailyFileLogger {
    path: PathBuf,
    log_dir: PathBuf,
    caller_file: bool,
    caller_function: bool,
    clock: Box<dyn Clock>,
    resolver: Box<dyn CallerResolver>,
    state: Mutex<FileState>,
}

impl DailyFileLogger {
    /// Open a logger with the local clock and real caller resolution.
    ///
    /// A missing file is created, along with its parent directories. An
    /// existing file is appended to when `append` is set and truncated
    /// otherwise.
    ///
    /// `caller_function` takes effect for records written with
    /// [`log_error!`](crate::log_error); the [`log_error`](Self::log_error)
    /// method cannot see the enclosing function.
    pub fn open(
        path: impl Into<PathBuf>,
        caller_file: bool,
        caller_function: bool,
        append: bool,
    ) -> Result<Self> {
        LoggerBuilder::new(path)
            .with_caller_file(caller_file)
            .with_caller_function(caller_function)
            .with_append(append)
            .build()
    }

    /// Open a logger from configuration.
    pub fn from_config(config: &FileLogConfig) -> Result<Self> {
        LoggerBuilder::from_config(config).build()
    }

    /// Start building a logger for `path`.
    pub fn builder(path: impl Into<PathBuf>) -> LoggerBuilder {
        LoggerBuilder::new(path)
    }

    pub(crate) fn create(
        path: PathBuf,
        append: bool,
        caller_file: bool,
        caller_function: bool,
        clock: Box<dyn Clock>,
        resolver: Box<dyn CallerResolver>,
    ) -> Result<Self> {
        let log_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let opened = if path.exists() {
            OpenOptions::new()
                .write(true)
                .append(append)
                .truncate(!append)
                .open(&path)
        } else {
            if !log_dir.exists() {
                fs::create_dir_all(&log_dir).map_err(|source| Error::CreateDir {
                    path: log_dir.clone(),
                    source,
                })?;
            }
            File::create(&path)
        };
        let file = opened.map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;

        let start_date = clock.today();
        tracing::debug!(path = %path.display(), append, %start_date, "opened log file");

        Ok(Self {
            state: Mutex::new(FileState {
                file: Some(file),
                active_path: path.clone(),
                start_date,
            }),
            path,
            log_dir,
            caller_file,
            caller_function,
            clock,
            resolver,
        })
    }

    /// Path of the active log file, as configured.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the log file.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// File currently written to. Equal to [`path`](Self::path) unless a
    /// rotation had to fall back to a timestamped file.
    pub fn active_path(&self) -> PathBuf {
        self.lock().active_path.clone()
    }

    /// Local date the current file was started on.
    pub fn start_date(&self) -> Date {
        self.lock().start_date
    }

    /// Append a plain line: no tag, timestamp or caller annotation.
    pub fn log_line(&self, args: fmt::Arguments<'_>) -> Result<()> {
        let mut body = String::new();
        body.write_fmt(args)?;
        self.write_record(None, body)
    }

    /// Append a line tagged `[INFO]` with a timestamp.
    pub fn log_info(&self, args: fmt::Arguments<'_>) -> Result<()> {
        let mut body = String::new();
        body.write_fmt(args)?;
        self.write_record(Some(Tag::Info), body)
    }

    /// Append a line tagged `[ERROR]` with a timestamp, annotated with the
    /// caller's file and line when enabled.
    ///
    /// The function name is not known here; use
    /// [`log_error!`](crate::log_error) to include it.
    #[track_caller]
    pub fn log_error(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log_error_at(CallSite::from_location(Location::caller()), args)
    }

    /// Like [`log_error`](Self::log_error) with an explicit call site.
    pub fn log_error_at(&self, site: CallSite, args: fmt::Arguments<'_>) -> Result<()> {
        let mut body = String::new();
        if let Some(caller) = self.resolver.resolve(&site) {
            if self.caller_file {
                write!(body, "{}:{} ", caller.file, caller.line)?;
            }
            if self.caller_function
                && let Some(function) = &caller.function
            {
                write!(body, "{function} ")?;
            }
        }
        body.write_fmt(args)?;
        self.write_record(Some(Tag::Error), body)
    }

    /// Flush the current file to disk.
    pub fn sync(&self) -> Result<()> {
        if let Some(file) = self.lock().file.as_ref() {
            file.sync_all()?;
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, FileState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `write` on the current file under the lock, rotating first if
    /// the date changed. Rotation diagnostics go out after the lock is
    /// released.
    fn with_file<T>(
        &self,
        write: impl FnOnce(&mut File, PrimitiveDateTime) -> Result<T>,
    ) -> Result<T> {
        let mut events = Vec::new();
        let result = {
            let mut state = self.lock();
            let now = self.clock.now();
            self.prepare(&mut state, now, &mut events)
                .and_then(|file| write(file, now))
        };
        for event in &events {
            event.emit(&self.path);
        }
        result
    }

    fn write_record(&self, tag: Option<Tag>, body: String) -> Result<()> {
        self.with_file(|file, now| {
                let mut line = match tag {
                Some(tag) => format!(
                    "{}{} {}",
                    tag.as_str(),
                    now.format(TIMESTAMP_FORMAT)?,
                    body
                ),
                None => body,
            };
            if !line.ends_with('\n') {
                line.push('\n');
            }
            file.write_all(line.as_bytes())?;
            Ok(())
        })
    }

    /// Rotate if the date changed and make sure a file is open.
    fn prepare<'s>(
        &self,
        state: &'s mut FileState,
        now: PrimitiveDateTime,
        events: &mut Vec<RotationEvent>,
    ) -> Result<&'s mut File> {
        if now.date() != state.start_date {
            events.push(self.rotate(state, now)?);
        }
        let file = match state.file.take() {
            Some(file) => file,
            None => self.reopen(state, now, events)?,
        };
        Ok(state.file.insert(file))
    }

    /// Close the current file and archive it under yesterday's date.
    ///
    /// The archive is never overwritten. When it cannot be created the
    /// original file stays where it is and the next open appends to it.
    fn rotate(&self, state: &mut FileState, now: PrimitiveDateTime) -> Result<RotationEvent> {
        let today = now.date();
        let archive = archive_path(&self.path, today)?;

        drop(state.file.take());
        state.start_date = today;

        if archive.exists() {
            return Ok(RotationEvent::ArchiveExists { archive });
        }
        Ok(match fs::rename(&self.path, &archive) {
            Ok(()) => RotationEvent::Rotated {
                archive,
                date: today,
            },
            Err(error) => RotationEvent::ArchiveFailed { archive, error },
        })
    }

    /// Open the log path for appending, or a timestamped fallback next to it.
    fn reopen(
        &self,
        state: &mut FileState,
        now: PrimitiveDateTime,
        events: &mut Vec<RotationEvent>,
    ) -> Result<File> {
        let source = match open_append(&self.path) {
            Ok(file) => {
                state.active_path = self.path.clone();
                return Ok(file);
            }
            Err(err) => err,
        };

        let fallback = fallback_path(&self.path, now)?;
        match open_append(&fallback) {
            Ok(file) => {
                events.push(RotationEvent::Fallback {
                    fallback: fallback.clone(),
                    error: source,
                });
                state.active_path = fallback;
                Ok(file)
            }
            Err(_) => Err(Error::Reopen {
                path: self.path.clone(),
                fallback,
                source,
            }),
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl fmt::Debug for DailyFileLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DailyFileLogger")
            .field("path", &self.path)
            .field("caller_file", &self.caller_file)
            .field("caller_function", &self.caller_function)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Raw bytes go through the same lock and rotation check as records.
impl Write for &DailyFileLogger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.with_file(|file, _| Ok(file.write(buf)?))?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.sync()?)
    }
}

impl Write for DailyFileLogger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&mut &*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&mut &*self).flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Caller, FixedCaller, ManualClock, Unresolved};
    use std::sync::Arc;
    use time::Duration;
    use time::macros::{date, datetime};

    fn manual_logger(path: &Path, clock: &Arc<ManualClock>) -> DailyFileLogger {
        DailyFileLogger::builder(path)
            .with_clock(clock.clone())
            .build()
            .expect("create logger")
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested/inner");
        let log_path = nested.join("test.log");
        assert!(!nested.exists());

        let logger = DailyFileLogger::open(&log_path, false, false, false).expect("create logger");
        logger.log_line(format_args!("hello parent")).unwrap();

        assert_eq!(logger.log_dir(), nested.as_path());
        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "hello parent\n");
    }

    #[test]
    fn test_log_dir_is_parent() {
        let dir = tempfile::tempdir().unwrap();
        let logger = DailyFileLogger::open(dir.path().join("a.log"), false, false, false).unwrap();
        assert_eq!(logger.log_dir(), dir.path());
        assert_eq!(logger.path(), dir.path().join("a.log"));
    }

    #[test]
    fn test_open_fails_when_dir_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file.txt");
        std::fs::write(&blocker, "not a dir").unwrap();

        let err = DailyFileLogger::open(blocker.join("sub/app.log"), false, false, false)
            .expect_err("parent is a file");
        assert!(matches!(err, Error::CreateDir { .. }), "{err:?}");
    }

    #[test]
    fn test_open_fails_on_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = DailyFileLogger::open(dir.path(), false, false, false).expect_err("is a dir");
        assert!(matches!(err, Error::Open { .. }), "{err:?}");
    }

    #[test]
    fn test_log_line_appends_newline_once() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        let logger = DailyFileLogger::open(&log_path, true, true, false).unwrap();

        logger.log_line(format_args!("one")).unwrap();
        logger.log_line(format_args!("two\n")).unwrap();

        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_tagged_records_carry_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        let clock = Arc::new(ManualClock::new(datetime!(2026-10-18 09:05:03)));
        let logger = DailyFileLogger::builder(&log_path)
            .with_clock(clock.clone())
            .with_resolver(Unresolved)
            .with_caller_file(true)
            .build()
            .unwrap();

        logger.log_info(format_args!("started {}", 1)).unwrap();
        logger.log_error(format_args!("failed {}", 2)).unwrap();

        assert_eq!(
            std::fs::read_to_string(&log_path).unwrap(),
            "[INFO]2026/10/18 09:05:03 started 1\n[ERROR]2026/10/18 09:05:03 failed 2\n"
        );
    }

    #[test]
    fn test_error_annotation_order() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        let clock = Arc::new(ManualClock::new(datetime!(2026-10-18 10:00:00)));
        let logger = DailyFileLogger::builder(&log_path)
            .with_clock(clock)
            .with_resolver(FixedCaller(Caller::new("main.rs", 12, Some("app::run"))))
            .with_caller_file(true)
            .with_caller_function(true)
            .build()
            .unwrap();

        logger.log_error(format_args!("boom")).unwrap();

        assert_eq!(
            std::fs::read_to_string(&log_path).unwrap(),
            "[ERROR]2026/10/18 10:00:00 main.rs:12 app::run boom\n"
        );
    }

    #[test]
    fn test_track_caller_resolves_this_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        let logger = DailyFileLogger::open(&log_path, true, false, false).unwrap();

        let line = line!() + 1;
        logger.log_error(format_args!("here")).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains(&format!(" logger.rs:{line} here")), "{content}");
    }

    #[test]
    fn test_rotation_on_date_change() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        let clock = Arc::new(ManualClock::new(datetime!(2026-10-17 23:59:58)));
        let logger = manual_logger(&log_path, &clock);

        logger.log_line(format_args!("before")).unwrap();
        assert_eq!(logger.start_date(), date!(2026 - 10 - 17));

        clock.advance(Duration::seconds(5));
        logger.log_line(format_args!("after")).unwrap();

        let archive = dir.path().join("test.log.2026-10-17");
        assert_eq!(std::fs::read_to_string(&archive).unwrap(), "before\n");
        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "after\n");
        assert_eq!(logger.start_date(), date!(2026 - 10 - 18));
        assert_eq!(logger.active_path(), log_path);
    }

    #[test]
    fn test_no_rotation_within_same_day() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        let clock = Arc::new(ManualClock::new(datetime!(2026-10-18 00:00:00)));
        let logger = manual_logger(&log_path, &clock);

        logger.log_line(format_args!("a")).unwrap();
        clock.advance(Duration::hours(23));
        logger.log_line(format_args!("b")).unwrap();

        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "a\nb\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_archive_name_is_day_before_write() {
        // Several idle days: the archive is still named after yesterday.
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        let clock = Arc::new(ManualClock::new(datetime!(2026-10-10 12:00)));
        let logger = manual_logger(&log_path, &clock);

        logger.log_line(format_args!("old")).unwrap();
        clock.set(datetime!(2026-10-18 08:00));
        logger.log_line(format_args!("new")).unwrap();

        assert!(dir.path().join("test.log.2026-10-17").exists());
        assert!(!dir.path().join("test.log.2026-10-10").exists());
    }

    #[test]
    fn test_existing_archive_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        let archive = dir.path().join("test.log.2026-10-17");
        std::fs::write(&archive, "archived earlier\n").unwrap();

        let clock = Arc::new(ManualClock::new(datetime!(2026-10-17 22:00)));
        let logger = manual_logger(&log_path, &clock);
        logger.log_line(format_args!("day one")).unwrap();

        clock.advance(Duration::hours(3));
        logger.log_line(format_args!("day two")).unwrap();

        assert_eq!(std::fs::read_to_string(&archive).unwrap(), "archived earlier\n");
        assert_eq!(
            std::fs::read_to_string(&log_path).unwrap(),
            "day one\nday two\n"
        );
    }

    #[test]
    fn test_reopen_falls_back_to_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        std::fs::write(dir.path().join("test.log.2026-10-17"), "").unwrap();

        let clock = Arc::new(ManualClock::new(datetime!(2026-10-17 23:00)));
        let logger = manual_logger(&log_path, &clock);
        logger.log_line(format_args!("day one")).unwrap();

        // Archive is taken and the log path turns into a directory.
        std::fs::remove_file(&log_path).unwrap();
        std::fs::create_dir(&log_path).unwrap();

        clock.set(datetime!(2026-10-18 00:00:07));
        logger.log_line(format_args!("day two")).unwrap();

        let fallback = dir.path().join("test.log.2026-10-18T000007");
        assert_eq!(logger.active_path(), fallback);
        assert_eq!(std::fs::read_to_string(&fallback).unwrap(), "day two\n");
    }

    #[test]
    fn test_reopen_failure_is_reported_until_recovered() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        std::fs::write(dir.path().join("test.log.2026-10-17"), "").unwrap();

        let clock = Arc::new(ManualClock::new(datetime!(2026-10-17 23:00)));
        let logger = manual_logger(&log_path, &clock);
        logger.log_line(format_args!("day one")).unwrap();

        std::fs::remove_file(&log_path).unwrap();
        std::fs::create_dir(&log_path).unwrap();
        std::fs::create_dir(dir.path().join("test.log.2026-10-18T000000")).unwrap();

        clock.set(datetime!(2026-10-18 00:00:00));
        let err = logger.log_line(format_args!("lost")).expect_err("no file");
        assert!(matches!(err, Error::Reopen { .. }), "{err:?}");
        let err = logger.log_line(format_args!("lost again")).expect_err("still no file");
        assert!(matches!(err, Error::Reopen { .. }), "{err:?}");

        std::fs::remove_dir(&log_path).unwrap();
        logger.log_line(format_args!("recovered")).unwrap();
        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "recovered\n");
        assert_eq!(logger.start_date(), date!(2026 - 10 - 18));
    }

    #[test]
    fn test_io_write_goes_through_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        let clock = Arc::new(ManualClock::new(datetime!(2026-10-17 23:59:59)));
        let logger = manual_logger(&log_path, &clock);

        (&logger).write_all(b"raw one\n").unwrap();
        clock.advance(Duration::seconds(1));
        (&logger).write_all(b"raw two\n").unwrap();
        (&logger).flush().unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("test.log.2026-10-17")).unwrap(),
            "raw one\n"
        );
        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "raw two\n");
    }

    #[test]
    fn test_owned_io_write() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        let clock = Arc::new(ManualClock::new(datetime!(2026-10-17 23:59:59)));
        let mut logger = manual_logger(&log_path, &clock);

        writeln!(logger, "owned {}", 1).unwrap();
        clock.advance(Duration::seconds(1));
        logger.write_all(b"owned 2\n").unwrap();
        logger.flush().unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("test.log.2026-10-17")).unwrap(),
            "owned 1\n"
        );
        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "owned 2\n");
    }

    #[test]
    fn test_rotation_from_fallback_returns_to_log_path() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        std::fs::write(dir.path().join("test.log.2026-10-17"), "").unwrap();

        let clock = Arc::new(ManualClock::new(datetime!(2026-10-17 23:00)));
        let logger = manual_logger(&log_path, &clock);
        logger.log_line(format_args!("day one")).unwrap();

        std::fs::remove_file(&log_path).unwrap();
        std::fs::create_dir(&log_path).unwrap();
        clock.set(datetime!(2026-10-18 00:00:07));
        logger.log_line(format_args!("day two")).unwrap();
        let fallback = dir.path().join("test.log.2026-10-18T000007");
        assert_eq!(logger.active_path(), fallback);

        // The log path is gone by the next day, so there is nothing to archive.
        std::fs::remove_dir(&log_path).unwrap();
        clock.set(datetime!(2026-10-19 09:00));
        logger.log_line(format_args!("day three")).unwrap();

        assert_eq!(logger.active_path(), log_path);
        assert_eq!(logger.start_date(), date!(2026 - 10 - 19));
        assert!(!dir.path().join("test.log.2026-10-18").exists());
        assert_eq!(std::fs::read_to_string(&fallback).unwrap(), "day two\n");
        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "day three\n");
    }
}
