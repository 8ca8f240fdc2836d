//! Caller resolution for annotated error records.
//!
//! A [`CallSite`] is captured where the logging call is written, either through
//! `#[track_caller]` or by the [`log_error!`](crate::log_error) macro. The
//! logger hands it to a [`CallerResolver`], which decides what is printed.
//! Tests swap in [`FixedCaller`] or [`Unresolved`] instead of depending on
//! real source locations.

use std::panic::Location;
use std::path::Path;

/// Where a logging call was made, as seen by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    /// Fully-qualified path of the enclosing function, when known.
    pub function: Option<&'static str>,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32, function: Option<&'static str>) -> Self {
        Self {
            file,
            line,
            function,
        }
    }

    /// The site recorded by `#[track_caller]`; no function name.
    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line(), None)
    }
}

/// A resolved caller, ready to be printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// File name without directories.
    pub file: String,
    pub line: u32,
    pub function: Option<String>,
}

impl Caller {
    pub fn new(file: impl Into<String>, line: u32, function: Option<&str>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.map(str::to_string),
        }
    }
}

/// Turns a call site into the caller printed on error records.
///
/// Returning `None` means resolution failed; the record is written without
/// annotation.
pub trait CallerResolver: Send + Sync {
    fn resolve(&self, site: &CallSite) -> Option<Caller>;
}

/// Resolves from the call site itself, keeping only the file's base name.
#[derive(Debug, Default, Clone, Copy)]
pub struct SiteResolver;

impl CallerResolver for SiteResolver {
    fn resolve(&self, site: &CallSite) -> Option<Caller> {
        let file = Path::new(site.file)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())?;
        Some(Caller::new(file, site.line, site.function))
    }
}

/// Always resolves to the same caller.
#[derive(Debug, Clone)]
pub struct FixedCaller(pub Caller);

impl CallerResolver for FixedCaller {
    fn resolve(&self, _site: &CallSite) -> Option<Caller> {
        Some(self.0.clone())
    }
}

/// Never resolves.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unresolved;

impl CallerResolver for Unresolved {
    fn resolve(&self, _site: &CallSite) -> Option<Caller> {
        None
    }
}

/// Expands to the fully-qualified path of the enclosing function.
///
/// Closure frames are stripped, so a call inside a closure in `app::run`
/// yields `app::run`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        let name = name.strip_suffix("::__here").unwrap_or(name);
        name.trim_end_matches("::{{closure}}")
    }};
}
