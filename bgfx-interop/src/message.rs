//! Fixed-capacity trace message buffer
//!
//! Trace messages are rendered into a 256-byte stack buffer. Text that
//! does not fit is cut on a UTF-8 boundary and ends with
//! [`TRUNCATION_MARKER`]; the rendered message, marker included, never
//! exceeds `MESSAGE_CAPACITY - 1` bytes plus the NUL terminator.

use crate::ffi::{self, VaList};
use crate::types::{InteropError, Result};
use std::borrow::Cow;
use std::ffi::{c_char, CStr};
use std::fmt;

/// Buffer size in bytes, NUL terminator included
pub const MESSAGE_CAPACITY: usize = 256;

/// Appended to messages that were cut to fit
pub const TRUNCATION_MARKER: &str = "...";

const MAX_LEN: usize = MESSAGE_CAPACITY - 1;

/// A NUL-terminated message of at most `MESSAGE_CAPACITY - 1` bytes
#[derive(Clone)]
pub struct BoundedMessage {
    buf: [u8; MESSAGE_CAPACITY],
    len: usize,
    truncated: bool,
}

impl BoundedMessage {
    /// Create an empty message
    pub fn new() -> Self {
        Self {
            buf: [0; MESSAGE_CAPACITY],
            len: 0,
            truncated: false,
        }
    }

    /// Render a printf-style format and its `va_list` with `vsnprintf`
    ///
    /// # Safety
    ///
    /// `format` must be a valid NUL-terminated C string and `arg_list` a
    /// live `va_list` whose arguments match it. `arg_list` is consumed.
    pub unsafe fn vformat(format: *const c_char, arg_list: VaList) -> Result<Self> {
        let mut message = Self::new();

        let written = ffi::vsnprintf(
            message.buf.as_mut_ptr().cast::<c_char>(),
            MESSAGE_CAPACITY,
            format,
            arg_list,
        );

        if written < 0 {
            return Err(InteropError::Format(format!(
                "vsnprintf returned {}",
                written
            )));
        }

        let written = written as usize;
        if written <= MAX_LEN {
            message.len = written;
        } else {
            // vsnprintf filled MAX_LEN bytes and terminated them
            message.len = MAX_LEN;
            message.mark_truncated();
        }

        Ok(message)
    }

    /// Render Rust format arguments with the same truncation policy
    pub fn format(args: fmt::Arguments<'_>) -> Self {
        let mut message = Self::new();
        // write_str never fails; overflow becomes truncation
        let _ = fmt::Write::write_fmt(&mut message, args);
        message
    }

    /// Message bytes without the terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Message as a C string (stops at the first NUL the format produced)
    pub fn as_c_str(&self) -> &CStr {
        CStr::from_bytes_until_nul(&self.buf[..=self.len]).unwrap_or_default()
    }

    /// Message as text, replacing invalid UTF-8
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if the rendered text did not fit and was cut
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Replace the tail with the marker, backing off to a char boundary
    fn mark_truncated(&mut self) {
        let mut cut = (MAX_LEN - TRUNCATION_MARKER.len()).min(self.len);
        while cut > 0 && is_utf8_continuation(self.buf[cut]) {
            cut -= 1;
        }

        let end = cut + TRUNCATION_MARKER.len();
        self.buf[cut..end].copy_from_slice(TRUNCATION_MARKER.as_bytes());
        self.buf[end] = 0;
        self.len = end;
        self.truncated = true;
    }
}

impl Default for BoundedMessage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for BoundedMessage {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated || s.is_empty() {
            return Ok(());
        }

        let room = MAX_LEN - self.len;
        let take = s.len().min(room);
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        self.buf[self.len] = 0;

        if take < s.len() {
            self.mark_truncated();
        }
        Ok(())
    }
}

impl fmt::Debug for BoundedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedMessage")
            .field("text", &self.to_string_lossy())
            .field("truncated", &self.truncated)
            .finish()
    }
}

fn is_utf8_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}
