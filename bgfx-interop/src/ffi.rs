//! FFI mirrors of bgfx's C99 callback interface
//!
//! Layouts here must match `bgfx/c99/bgfx.h` bit-for-bit; bgfx reads the
//! vtable by offset. `csrc/bgfx_interop.h` carries the same declarations
//! for the C side of the crate.

use std::ffi::{c_char, c_int, c_void};

/// Raw `bgfx_fatal_t` as it crosses the boundary (a C enum, `int` sized).
///
/// Kept untyped so out-of-range values from a newer bgfx are forwarded
/// instead of becoming undefined behavior. See [`crate::Fatal`] for the
/// typed view.
pub type RawFatal = c_int;

/// Raw `bgfx_texture_format_t`.
pub type RawTextureFormat = c_int;

/// Opaque `va_list` as passed by value to a C function.
///
/// On every target bgfx supports this is pointer sized: either a plain
/// `char*` (Windows, Apple arm64) or an array/struct that is passed as a
/// pointer to the caller's storage (SysV x86_64, AAPCS64).
pub type VaList = *mut c_void;

/// Host log sink: `void (*)(const char* string)`
pub type LogFunction = Option<unsafe extern "C" fn(string: *const c_char)>;

/// Host fatal sink: `void (*)(const char* file_path, uint16_t line, bgfx_fatal_t code, const char* string)`
pub type FatalFunction = Option<
    unsafe extern "C" fn(file_path: *const c_char, line: u16, code: RawFatal, string: *const c_char),
>;

/// `bgfx_callback_interface_t`
#[repr(C)]
#[derive(Debug)]
pub struct BgfxCallbackInterface {
    pub vtbl: *const BgfxCallbackVtbl,
}

/// `bgfx_callback_vtbl_t`: the twelve slots bgfx calls, in header order.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct BgfxCallbackVtbl {
    pub fatal: unsafe extern "C" fn(
        this: *mut BgfxCallbackInterface,
        file_path: *const c_char,
        line: u16,
        code: RawFatal,
        string: *const c_char,
    ),
    pub trace_vargs: unsafe extern "C" fn(
        this: *mut BgfxCallbackInterface,
        file_path: *const c_char,
        line: u16,
        format: *const c_char,
        arg_list: VaList,
    ),
    pub profiler_begin: unsafe extern "C" fn(
        this: *mut BgfxCallbackInterface,
        name: *const c_char,
        abgr: u32,
        file_path: *const c_char,
        line: u16,
    ),
    pub profiler_begin_literal: unsafe extern "C" fn(
        this: *mut BgfxCallbackInterface,
        name: *const c_char,
        abgr: u32,
        file_path: *const c_char,
        line: u16,
    ),
    pub profiler_end: unsafe extern "C" fn(this: *mut BgfxCallbackInterface),
    pub cache_read_size: unsafe extern "C" fn(this: *mut BgfxCallbackInterface, id: u64) -> u32,
    pub cache_read: unsafe extern "C" fn(
        this: *mut BgfxCallbackInterface,
        id: u64,
        data: *mut c_void,
        size: u32,
    ) -> bool,
    pub cache_write: unsafe extern "C" fn(
        this: *mut BgfxCallbackInterface,
        id: u64,
        data: *const c_void,
        size: u32,
    ),
    pub screen_shot: unsafe extern "C" fn(
        this: *mut BgfxCallbackInterface,
        file_path: *const c_char,
        width: u32,
        height: u32,
        pitch: u32,
        data: *const c_void,
        size: u32,
        yflip: bool,
    ),
    pub capture_begin: unsafe extern "C" fn(
        this: *mut BgfxCallbackInterface,
        width: u32,
        height: u32,
        pitch: u32,
        format: RawTextureFormat,
        yflip: bool,
    ),
    pub capture_end: unsafe extern "C" fn(this: *mut BgfxCallbackInterface),
    pub capture_frame: unsafe extern "C" fn(
        this: *mut BgfxCallbackInterface,
        data: *const c_void,
        size: u32,
    ),
}

impl std::fmt::Debug for BgfxCallbackVtbl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BgfxCallbackVtbl").finish_non_exhaustive()
    }
}

extern "C" {
    /// C library `vsnprintf`. Consumes `arg_list`.
    pub fn vsnprintf(
        buffer: *mut c_char,
        size: usize,
        format: *const c_char,
        arg_list: VaList,
    ) -> c_int;
}

#[link(name = "bgfx_interop_trace", kind = "static")]
extern "C" {
    /// Variadic trace entry compiled from `csrc/trace.c`.
    ///
    /// Packs `...` into a `va_list` and calls `this->vtbl->trace_vargs`,
    /// which is how bgfx itself reaches the callback.
    pub fn bgfx_interop_trace(
        this: *mut BgfxCallbackInterface,
        file_path: *const c_char,
        line: u16,
        format: *const c_char,
        ...
    );
}
