//! Core types for the bgfx callback shim
//!
//! Typed views of the raw values bgfx hands to the callbacks, plus the
//! error and status types used on both sides of the C boundary.

use crate::ffi::RawFatal;
use std::fmt;

/// Result type for interop operations
pub type Result<T> = std::result::Result<T, InteropError>;

/// Fatal error classification reported by bgfx (`bgfx_fatal_t`)
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fatal {
    DebugCheck = 0,
    InvalidShader = 1,
    UnableToInitialize = 2,
    UnableToCreateTexture = 3,
    DeviceLost = 4,
}

impl Fatal {
    /// Map a raw `bgfx_fatal_t`; `None` for values this build does not know
    pub fn from_raw(raw: RawFatal) -> Option<Self> {
        match raw {
            0 => Some(Fatal::DebugCheck),
            1 => Some(Fatal::InvalidShader),
            2 => Some(Fatal::UnableToInitialize),
            3 => Some(Fatal::UnableToCreateTexture),
            4 => Some(Fatal::DeviceLost),
            _ => None,
        }
    }

    /// The raw value bgfx uses for this code
    pub fn as_raw(self) -> RawFatal {
        self as RawFatal
    }
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fatal::DebugCheck => "DebugCheck",
            Fatal::InvalidShader => "InvalidShader",
            Fatal::UnableToInitialize => "UnableToInitialize",
            Fatal::UnableToCreateTexture => "UnableToCreateTexture",
            Fatal::DeviceLost => "DeviceLost",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in the interop layer
#[derive(Debug, thiserror::Error)]
pub enum InteropError {
    #[error("Null callback interface handle")]
    NullHandle,

    #[error("Callback interface handle {0:#x} is not live (never created or already destroyed)")]
    UnknownHandle(usize),

    #[error("Failed to render trace message: {0}")]
    Format(String),
}

/// Status code returned across the C boundary
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteropStatus {
    Ok = 0,
    NullHandle = 1,
    UnknownHandle = 2,
    FormatFailed = 3,
}

impl From<&InteropError> for InteropStatus {
    fn from(error: &InteropError) -> Self {
        match error {
            InteropError::NullHandle => InteropStatus::NullHandle,
            InteropError::UnknownHandle(_) => InteropStatus::UnknownHandle,
            InteropError::Format(_) => InteropStatus::FormatFailed,
        }
    }
}
