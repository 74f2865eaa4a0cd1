//! bgfx callback interop
//!
//! Adapts bgfx's C99 callback interface (`bgfx_callback_interface_t`)
//! to two host-supplied sinks: one for trace messages and one for fatal
//! errors. Every other callback slot is a neutral stub so bgfx sees a
//! complete implementation.
//!
//! # Architecture
//!
//! - [`Adapter`] owns the interface, its dispatch table and a
//!   [`CallbackHandler`] in one allocation
//! - Trace messages are rendered into a fixed 256-byte
//!   [`BoundedMessage`] and truncated with a visible marker
//! - `create_bgfx_interface` / `destroy_bgfx_interface` expose the
//!   adapter to non-Rust hosts
//!
//! The adapter does NOT:
//! - Support profiling, screenshots or frame capture
//! - Cache compiled shaders (reads always miss)
//! - Decide whether a fatal error terminates the process
//!
//! # Example Usage
//!
//! ```no_run
//! use bgfx_interop::{Adapter, Callbacks};
//!
//! let adapter = Adapter::new(
//!     Callbacks::new()
//!         .on_log(|msg| println!("[bgfx] {}", msg))
//!         .on_fatal(|report| {
//!             eprintln!("bgfx fatal: {}", report);
//!             std::process::abort();
//!         }),
//! );
//!
//! // Pass this as bgfx_init_t::callback; keep `adapter` alive until
//! // bgfx_shutdown() has returned.
//! let callback = adapter.as_interface_ptr();
//! # let _ = callback;
//! ```

// Public modules
pub mod adapter;
pub mod exports;
pub mod ffi;
pub mod handler;
pub mod message;
pub mod types;

// Re-export main types for convenience
pub use adapter::Adapter;
pub use exports::{create_bgfx_interface, destroy_bgfx_interface, CallbackInterface};
pub use handler::{CallbackHandler, Callbacks, FatalReport, ForeignSinks, LogForwarder};
pub use message::{BoundedMessage, MESSAGE_CAPACITY, TRUNCATION_MARKER};
pub use types::{Fatal, InteropError, InteropStatus, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
