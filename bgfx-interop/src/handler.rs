//! Consumer-facing callback handlers
//!
//! The adapter only cares about two categories of notification: trace
//! messages and fatal errors. A [`CallbackHandler`] receives both. Three
//! implementations ship with the crate:
//! - [`ForeignSinks`]: the two C function pointers supplied through
//!   `create_bgfx_interface`
//! - [`Callbacks`]: optional Rust closures, one per category
//! - [`LogForwarder`]: routes everything into the `log` facade

use crate::ffi::{FatalFunction, LogFunction, RawFatal};
use crate::types::Fatal;
use std::borrow::Cow;
use std::ffi::{c_char, CStr};
use std::fmt;
use std::ptr;

/// Log target used by [`LogForwarder`]
pub const LOG_TARGET: &str = "bgfx";

/// A fatal notification exactly as bgfx reported it
///
/// The strings are `None` when bgfx passed a null pointer.
#[derive(Debug, Clone, Copy)]
pub struct FatalReport<'a> {
    /// Source file inside bgfx that raised the error
    pub file_path: Option<&'a CStr>,
    pub line: u16,
    /// Raw `bgfx_fatal_t`, untouched
    pub code: RawFatal,
    pub message: Option<&'a CStr>,
}

impl<'a> FatalReport<'a> {
    /// Typed error code, if it is one this build knows
    pub fn fatal(&self) -> Option<Fatal> {
        Fatal::from_raw(self.code)
    }

    /// File path as text; empty if bgfx sent none
    pub fn file_path_lossy(&self) -> Cow<'a, str> {
        self.file_path.map_or(Cow::Borrowed(""), CStr::to_string_lossy)
    }

    /// Message text with bgfx's trailing newline removed
    pub fn message_lossy(&self) -> Cow<'a, str> {
        trim_end(self.message.map_or(Cow::Borrowed(""), CStr::to_string_lossy))
    }
}

fn as_ptr_or_null(text: Option<&CStr>) -> *const c_char {
    text.map_or(ptr::null(), CStr::as_ptr)
}

impl fmt::Display for FatalReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}): ", self.file_path_lossy(), self.line)?;
        match self.fatal() {
            Some(code) => write!(f, "{}", code)?,
            None => write!(f, "Unknown({})", self.code)?,
        }
        write!(f, ": {}", self.message_lossy())
    }
}

/// Receiver for the notifications the adapter forwards
///
/// Called from whichever thread bgfx uses, so implementations must be
/// `Send + Sync`. Calls are synchronous and must not block for long.
pub trait CallbackHandler: Send + Sync {
    /// A rendered trace message (at most 255 bytes)
    fn log(&self, message: &CStr);

    /// A fatal error. Whether to terminate is up to the handler.
    fn fatal(&self, report: &FatalReport<'_>);
}

/// Host-supplied C function pointers
///
/// A null pointer is accepted at construction and checked when its
/// category fires; the notification is then dropped with a warning.
/// Fatal arguments reach the sink as bgfx sent them, null strings
/// included.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ForeignSinks {
    pub log: LogFunction,
    pub fatal: FatalFunction,
}

impl ForeignSinks {
    pub fn new(log: LogFunction, fatal: FatalFunction) -> Self {
        Self { log, fatal }
    }
}

impl CallbackHandler for ForeignSinks {
    fn log(&self, message: &CStr) {
        match self.log {
            Some(log_func) => unsafe { log_func(message.as_ptr()) },
            None => log::warn!(
                "Dropping bgfx trace, no log sink installed: {}",
                message.to_string_lossy().trim_end()
            ),
        }
    }

    fn fatal(&self, report: &FatalReport<'_>) {
        match self.fatal {
            Some(fatal_func) => unsafe {
                fatal_func(
                    as_ptr_or_null(report.file_path),
                    report.line,
                    report.code,
                    as_ptr_or_null(report.message),
                )
            },
            None => log::warn!("Dropping bgfx fatal error, no fatal sink installed: {}", report),
        }
    }
}

type LogClosure = Box<dyn Fn(&str) + Send + Sync>;
type FatalClosure = Box<dyn Fn(&FatalReport<'_>) + Send + Sync>;

/// Closure-based handler; either category may be left unset
///
/// Log messages are delivered as text with the trailing newline bgfx
/// appends already trimmed.
#[derive(Default)]
pub struct Callbacks {
    log: Option<LogClosure>,
    fatal: Option<FatalClosure>,
}

impl Callbacks {
    /// Create a handler that ignores everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the trace message callback
    pub fn on_log(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.log = Some(Box::new(f));
        self
    }

    /// Builder method: set the fatal error callback
    pub fn on_fatal(mut self, f: impl Fn(&FatalReport<'_>) + Send + Sync + 'static) -> Self {
        self.fatal = Some(Box::new(f));
        self
    }
}

impl CallbackHandler for Callbacks {
    fn log(&self, message: &CStr) {
        if let Some(log_fn) = &self.log {
            log_fn(&trim_end(message.to_string_lossy()));
        }
    }

    fn fatal(&self, report: &FatalReport<'_>) {
        if let Some(fatal_fn) = &self.fatal {
            fatal_fn(report);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("log", &self.log.is_some())
            .field("fatal", &self.fatal.is_some())
            .finish()
    }
}

/// Routes bgfx traces to `log::debug!` and fatal errors to `log::error!`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogForwarder;

impl CallbackHandler for LogForwarder {
    fn log(&self, message: &CStr) {
        log::debug!(target: LOG_TARGET, "{}", trim_end(message.to_string_lossy()));
    }

    fn fatal(&self, report: &FatalReport<'_>) {
        log::error!(target: LOG_TARGET, "{}", report);
    }
}

fn trim_end(text: Cow<'_, str>) -> Cow<'_, str> {
    match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.trim_end()),
        Cow::Owned(s) => Cow::Owned(s.trim_end().to_owned()),
    }
}
