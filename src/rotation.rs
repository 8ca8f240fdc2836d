//! Date formats and file naming for daily rotation.

use std::path::{Path, PathBuf};

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

use crate::Result;

/// `YYYY-MM-DD`, used for the start date and archive suffixes.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// `YYYY/MM/DD HH:MM:SS`, the timestamp on tagged records.
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");

const FALLBACK_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour][minute][second]");

/// Format a calendar date as `YYYY-MM-DD`.
pub fn date_suffix(date: Date) -> Result<String> {
    Ok(date.format(DATE_FORMAT)?)
}

/// Where the active file is archived when rotating on `today`.
///
/// The suffix is the day before `today`, regardless of when the file was
/// last written.
pub fn archive_path(path: &Path, today: Date) -> Result<PathBuf> {
    let yesterday = today.previous_day().unwrap_or(today);
    Ok(with_suffix(path, &date_suffix(yesterday)?))
}

/// The file to use when `path` itself cannot be reopened after a rotation.
pub fn fallback_path(path: &Path, now: PrimitiveDateTime) -> Result<PathBuf> {
    Ok(with_suffix(path, &now.format(FALLBACK_FORMAT)?))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
