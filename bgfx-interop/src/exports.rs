//! C entry points for the host application
//!
//! ```c
//! typedef void (*log_function_t)(const char* string);
//! typedef void (*fatal_function_t)(const char* file_path, uint16_t line, bgfx_fatal_t code, const char* string);
//!
//! callback_interface_t* create_bgfx_interface(log_function_t log_func, fatal_function_t fatal_func);
//! int32_t destroy_bgfx_interface(callback_interface_t* interface);
//! ```
//!
//! The returned pointer doubles as a `bgfx_callback_interface_t*`.
//! Every live pointer is tracked so that destroying a null, foreign or
//! already destroyed handle is reported instead of freeing garbage.

use crate::adapter::Adapter;
use crate::ffi::{FatalFunction, LogFunction};
use crate::handler::ForeignSinks;
use crate::types::{InteropError, InteropStatus, Result};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Handle type handed across the C boundary
pub type CallbackInterface = Adapter<ForeignSinks>;

fn live_handles() -> MutexGuard<'static, HashSet<usize>> {
    static LIVE: OnceLock<Mutex<HashSet<usize>>> = OnceLock::new();
    LIVE.get_or_init(|| Mutex::new(HashSet::new()))
        .lock()
        // The set stays consistent even if a holder panicked
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Number of handles created through the C ABI and not yet destroyed
pub fn live_interface_count() -> usize {
    live_handles().len()
}

/// Create an adapter around two C sinks and register it as live
pub fn create(log_func: LogFunction, fatal_func: FatalFunction) -> *mut CallbackInterface {
    let raw = Adapter::into_raw(Adapter::new(ForeignSinks::new(log_func, fatal_func)));
    live_handles().insert(raw as usize);

    log::debug!(
        "Created bgfx callback interface at {:p} (log sink: {}, fatal sink: {})",
        raw,
        log_func.is_some(),
        fatal_func.is_some()
    );
    raw
}

/// Destroy a handle returned by [`create`]
///
/// Null and non-live pointers are rejected without being dereferenced.
///
/// # Safety
///
/// bgfx must no longer hold `handle`.
pub unsafe fn destroy(handle: *mut CallbackInterface) -> Result<()> {
    if handle.is_null() {
        return Err(InteropError::NullHandle);
    }

    if !live_handles().remove(&(handle as usize)) {
        return Err(InteropError::UnknownHandle(handle as usize));
    }

    drop(Adapter::from_raw(handle));
    Ok(())
}

#[no_mangle]
pub extern "C" fn create_bgfx_interface(
    log_func: LogFunction,
    fatal_func: FatalFunction,
) -> *mut CallbackInterface {
    create(log_func, fatal_func)
}

/// # Safety
///
/// `interface` must be null or a pointer returned by
/// `create_bgfx_interface` that bgfx no longer uses.
#[no_mangle]
pub unsafe extern "C" fn destroy_bgfx_interface(interface: *mut CallbackInterface) -> InteropStatus {
    match destroy(interface) {
        Ok(()) => InteropStatus::Ok,
        Err(e) => {
            log::error!("destroy_bgfx_interface: {}", e);
            InteropStatus::from(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::{BgfxCallbackInterface, RawFatal};
    use std::cell::RefCell;
    use std::ffi::{c_char, CStr};
    use std::ptr;

    thread_local! {
        static FATALS: RefCell<Vec<(String, u16, RawFatal, String)>> = const { RefCell::new(Vec::new()) };
    }

    unsafe extern "C" fn record_fatal(
        file_path: *const c_char,
        line: u16,
        code: RawFatal,
        string: *const c_char,
    ) {
        let entry = (
            CStr::from_ptr(file_path).to_string_lossy().into_owned(),
            line,
            code,
            CStr::from_ptr(string).to_string_lossy().into_owned(),
        );
        FATALS.with(|f| f.borrow_mut().push(entry));
    }

    #[test]
    fn test_create_then_destroy() {
        let handle = create_bgfx_interface(None, Some(record_fatal));
        assert!(!handle.is_null());

        let status = unsafe { destroy_bgfx_interface(handle) };
        assert_eq!(status, InteropStatus::Ok);
    }

    #[test]
    fn test_handle_is_a_bgfx_interface() {
        let handle = create_bgfx_interface(None, Some(record_fatal));
        let iface = handle as *mut BgfxCallbackInterface;

        unsafe {
            let vtbl = &*(*iface).vtbl;
            (vtbl.fatal)(iface, c"renderer.cpp".as_ptr(), 77, 2, c"no device".as_ptr());
            assert_eq!(destroy_bgfx_interface(handle), InteropStatus::Ok);
        }

        assert_eq!(
            FATALS.with(|f| f.borrow().clone()),
            vec![("renderer.cpp".to_string(), 77, 2, "no device".to_string())]
        );
    }

    #[test]
    fn test_destroy_null_fails_fast() {
        let status = unsafe { destroy_bgfx_interface(ptr::null_mut()) };
        assert_eq!(status, InteropStatus::NullHandle);
    }

    #[test]
    fn test_double_destroy_is_rejected() {
        let handle = create_bgfx_interface(None, None);

        unsafe {
            assert_eq!(destroy_bgfx_interface(handle), InteropStatus::Ok);
            assert_eq!(destroy_bgfx_interface(handle), InteropStatus::UnknownHandle);
        }
    }

    #[test]
    fn test_foreign_pointer_is_rejected() {
        let mut not_ours = 0u64;
        let bogus = ptr::addr_of_mut!(not_ours).cast::<CallbackInterface>();

        let result = unsafe { destroy(bogus) };
        assert!(matches!(result, Err(InteropError::UnknownHandle(_))));
    }
}
