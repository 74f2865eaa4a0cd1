//! The callback adapter handle and its trampolines
//!
//! An [`Adapter`] is a single heap allocation laid out as:
//!
//! ```text
//! +--------------------------+
//! | bgfx_callback_interface  |  <- pointer handed to bgfx
//! |   vtbl ------------------+--+
//! +--------------------------+  |
//! | bgfx_callback_vtbl (12)  |<-+
//! +--------------------------+
//! | handler: H               |
//! +--------------------------+
//! ```
//!
//! bgfx calls a slot with `_this` pointing at the first field; since the
//! struct is `#[repr(C)]` that is also the address of the adapter, which
//! is how the trampolines recover the handler. The table is embedded so
//! it lives and dies with its handle and is never shared.

use crate::ffi::{BgfxCallbackInterface, BgfxCallbackVtbl, RawFatal, RawTextureFormat, VaList};
use crate::handler::{CallbackHandler, FatalReport};
use crate::message::BoundedMessage;
use std::ffi::{c_char, c_void, CStr};
use std::marker::PhantomPinned;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::ptr;

/// bgfx callback interface backed by a [`CallbackHandler`]
///
/// Pinned because the interface points into its own allocation.
#[repr(C)]
pub struct Adapter<H: CallbackHandler> {
    interface: BgfxCallbackInterface,
    vtbl: BgfxCallbackVtbl,
    handler: H,
    _pinned: PhantomPinned,
}

impl<H: CallbackHandler> Adapter<H> {
    /// Allocate an adapter with a fully populated dispatch table
    pub fn new(handler: H) -> Pin<Box<Self>> {
        let mut adapter = Box::new(Self {
            interface: BgfxCallbackInterface { vtbl: ptr::null() },
            vtbl: Self::dispatch_table(),
            handler,
            _pinned: PhantomPinned,
        });
        adapter.interface.vtbl = ptr::addr_of!(adapter.vtbl);
        Box::into_pin(adapter)
    }

    fn dispatch_table() -> BgfxCallbackVtbl {
        BgfxCallbackVtbl {
            fatal: fatal::<H>,
            trace_vargs: trace_vargs::<H>,
            profiler_begin,
            profiler_begin_literal,
            profiler_end,
            cache_read_size,
            cache_read,
            cache_write,
            screen_shot,
            capture_begin,
            capture_end,
            capture_frame,
        }
    }

    /// The pointer to pass as `bgfx_init_t::callback`
    ///
    /// Valid for as long as this adapter is alive.
    pub fn as_interface_ptr(&self) -> *mut BgfxCallbackInterface {
        self as *const Self as *mut BgfxCallbackInterface
    }

    /// The dispatch table bgfx sees
    pub fn vtable(&self) -> &BgfxCallbackVtbl {
        &self.vtbl
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Hand ownership to a raw pointer (for the C ABI)
    pub fn into_raw(adapter: Pin<Box<Self>>) -> *mut Self {
        // The allocation is not moved; only its ownership is released
        Box::into_raw(unsafe { Pin::into_inner_unchecked(adapter) })
    }

    /// Take back ownership of a pointer produced by [`Adapter::into_raw`]
    ///
    /// # Safety
    ///
    /// `ptr` must come from `into_raw` for the same `H` and must not have
    /// been reclaimed already.
    pub unsafe fn from_raw(ptr: *mut Self) -> Pin<Box<Self>> {
        Pin::new_unchecked(Box::from_raw(ptr))
    }
}

impl<H: CallbackHandler> Drop for Adapter<H> {
    fn drop(&mut self) {
        log::debug!("Releasing bgfx callback interface at {:p}", self as *const Self);
        self.interface.vtbl = ptr::null();
    }
}

impl<H: CallbackHandler + std::fmt::Debug> std::fmt::Debug for Adapter<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("interface", &self.as_interface_ptr())
            .field("handler", &self.handler)
            .finish()
    }
}

/// Recover the adapter from bgfx's `_this`
unsafe fn adapter_from<'a, H: CallbackHandler>(
    this: *mut BgfxCallbackInterface,
) -> Option<&'a Adapter<H>> {
    (this as *const Adapter<H>).as_ref()
}

unsafe fn c_str_opt<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr))
    }
}

unsafe fn c_str_or_empty<'a>(ptr: *const c_char) -> &'a CStr {
    c_str_opt(ptr).unwrap_or_default()
}

/// Run a handler call without letting a panic unwind into C
fn guarded(slot: &str, f: impl FnOnce()) {
    if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
        log::error!("bgfx callback handler panicked in {}", slot);
    }
}

unsafe extern "C" fn fatal<H: CallbackHandler>(
    this: *mut BgfxCallbackInterface,
    file_path: *const c_char,
    line: u16,
    code: RawFatal,
    string: *const c_char,
) {
    let Some(adapter) = adapter_from::<H>(this) else {
        return;
    };

    let report = FatalReport {
        file_path: c_str_opt(file_path),
        line,
        code,
        message: c_str_opt(string),
    };
    guarded("fatal", || adapter.handler.fatal(&report));
}

unsafe extern "C" fn trace_vargs<H: CallbackHandler>(
    this: *mut BgfxCallbackInterface,
    file_path: *const c_char,
    line: u16,
    format: *const c_char,
    arg_list: VaList,
) {
    let Some(adapter) = adapter_from::<H>(this) else {
        return;
    };
    if format.is_null() {
        return;
    }

    match BoundedMessage::vformat(format, arg_list) {
        Ok(message) => {
            if message.is_truncated() {
                log::trace!(
                    "bgfx trace from {}:{} truncated to {} bytes",
                    c_str_or_empty(file_path).to_string_lossy(),
                    line,
                    message.len()
                );
            }
            guarded("trace_vargs", || adapter.handler.log(message.as_c_str()));
        }
        Err(e) => log::warn!(
            "Dropping bgfx trace from {}:{}: {}",
            c_str_or_empty(file_path).to_string_lossy(),
            line,
            e
        ),
    }
}

// Profiling is not supported.
unsafe extern "C" fn profiler_begin(
    _this: *mut BgfxCallbackInterface,
    _name: *const c_char,
    _abgr: u32,
    _file_path: *const c_char,
    _line: u16,
) {
}

unsafe extern "C" fn profiler_begin_literal(
    _this: *mut BgfxCallbackInterface,
    _name: *const c_char,
    _abgr: u32,
    _file_path: *const c_char,
    _line: u16,
) {
}

unsafe extern "C" fn profiler_end(_this: *mut BgfxCallbackInterface) {}

// The shader cache is permanently disabled: every read misses and
// writes are discarded.
unsafe extern "C" fn cache_read_size(_this: *mut BgfxCallbackInterface, _id: u64) -> u32 {
    0
}

unsafe extern "C" fn cache_read(
    _this: *mut BgfxCallbackInterface,
    _id: u64,
    _data: *mut c_void,
    _size: u32,
) -> bool {
    false
}

unsafe extern "C" fn cache_write(
    _this: *mut BgfxCallbackInterface,
    _id: u64,
    _data: *const c_void,
    _size: u32,
) {
}

#[allow(clippy::too_many_arguments)]
unsafe extern "C" fn screen_shot(
    _this: *mut BgfxCallbackInterface,
    _file_path: *const c_char,
    _width: u32,
    _height: u32,
    _pitch: u32,
    _data: *const c_void,
    _size: u32,
    _yflip: bool,
) {
}

unsafe extern "C" fn capture_begin(
    _this: *mut BgfxCallbackInterface,
    _width: u32,
    _height: u32,
    _pitch: u32,
    _format: RawTextureFormat,
    _yflip: bool,
) {
}

unsafe extern "C" fn capture_end(_this: *mut BgfxCallbackInterface) {}

unsafe extern "C" fn capture_frame(
    _this: *mut BgfxCallbackInterface,
    _data: *const c_void,
    _size: u32,
) {
}
