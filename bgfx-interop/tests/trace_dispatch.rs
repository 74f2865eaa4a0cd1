// End-to-end checks through the C entry points, with the trace path
// driven by a real variadic call the way bgfx makes it.
use bgfx_interop::ffi::{bgfx_interop_trace, BgfxCallbackInterface, RawFatal};
use bgfx_interop::{
    create_bgfx_interface, destroy_bgfx_interface, Adapter, Callbacks, Fatal, InteropStatus,
    MESSAGE_CAPACITY, TRUNCATION_MARKER,
};
use std::cell::RefCell;
use std::ffi::{c_char, c_int, c_uint, CStr, CString};
use std::sync::{Arc, Mutex};

thread_local! {
    static LOGGED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    static FATALS: RefCell<Vec<(String, u16, RawFatal, String)>> = const { RefCell::new(Vec::new()) };
}

unsafe extern "C" fn record_log(string: *const c_char) {
    let text = CStr::from_ptr(string).to_string_lossy().into_owned();
    LOGGED.with(|l| l.borrow_mut().push(text));
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

fn logged() -> Vec<String> {
    LOGGED.with(|l| l.borrow().clone())
}

fn fatals() -> Vec<(String, u16, RawFatal, String)> {
    FATALS.with(|f| f.borrow().clone())
}

#[test]
fn trace_then_fatal_then_destroy() {
    let handle = create_bgfx_interface(Some(record_log), Some(record_fatal));
    let iface = handle as *mut BgfxCallbackInterface;

    unsafe {
        bgfx_interop_trace(iface, c"bgfx.cpp".as_ptr(), 1, c"value=%d".as_ptr(), 42 as c_int);
    }
    assert_eq!(logged(), vec!["value=42".to_string()]);
    assert!(fatals().is_empty());

    unsafe {
        ((*(*iface).vtbl).fatal)(
            iface,
            c"shader.c".as_ptr(),
            10,
            Fatal::InvalidShader.as_raw(),
            c"bad shader".as_ptr(),
        );
    }
    assert_eq!(
        fatals(),
        vec![("shader.c".to_string(), 10, Fatal::InvalidShader.as_raw(), "bad shader".to_string())]
    );
    assert_eq!(logged().len(), 1);

    let status = unsafe { destroy_bgfx_interface(handle) };
    assert_eq!(status, InteropStatus::Ok);
}

#[test]
fn long_trace_is_truncated_not_overflowed() {
    let handle = create_bgfx_interface(Some(record_log), None);
    let iface = handle as *mut BgfxCallbackInterface;
    let payload = CString::new("w".repeat(4 * MESSAGE_CAPACITY)).unwrap();

    unsafe {
        bgfx_interop_trace(iface, c"bgfx.cpp".as_ptr(), 2, c"[%s]".as_ptr(), payload.as_ptr());
        assert_eq!(destroy_bgfx_interface(handle), InteropStatus::Ok);
    }

    let messages = logged();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].len() < MESSAGE_CAPACITY);
    assert!(messages[0].starts_with("[www"));
    assert!(messages[0].ends_with(TRUNCATION_MARKER));
}

#[test]
fn trace_without_log_sink_is_dropped() {
    let handle = create_bgfx_interface(None, Some(record_fatal));
    let iface = handle as *mut BgfxCallbackInterface;

    unsafe {
        bgfx_interop_trace(iface, c"bgfx.cpp".as_ptr(), 3, c"ignored %d".as_ptr(), 7 as c_int);
        assert_eq!(destroy_bgfx_interface(handle), InteropStatus::Ok);
    }

    assert!(logged().is_empty());
    assert!(fatals().is_empty());
}

#[test]
fn closure_handler_receives_trimmed_text() {
    let _ = env_logger::builder().is_test(true).try_init();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let adapter = Adapter::new(Callbacks::new().on_log(move |msg| {
        sink.lock().unwrap().push(msg.to_string());
    }));

    unsafe {
        bgfx_interop_trace(
            adapter.as_interface_ptr(),
            c"renderer_vk.cpp".as_ptr(),
            4,
            c"frame %u of %s\n".as_ptr(),
            3 as c_uint,
            c"level".as_ptr(),
        );
    }

    assert_eq!(*seen.lock().unwrap(), vec!["frame 3 of level".to_string()]);
}

fn trace_rendered(payload: &str) -> String {
    let handle = create_bgfx_interface(Some(record_log), None);
    let iface = handle as *mut BgfxCallbackInterface;
    let text = CString::new(payload).unwrap();

    unsafe {
        bgfx_interop_trace(iface, c"bgfx.cpp".as_ptr(), 5, c"%s".as_ptr(), text.as_ptr());
        assert_eq!(destroy_bgfx_interface(handle), InteropStatus::Ok);
    }

    let mut messages = logged();
    assert_eq!(messages.len(), 1);
    messages.remove(0)
}

#[test]
fn trace_filling_buffer_exactly_is_not_truncated() {
    let payload = "p".repeat(MESSAGE_CAPACITY - 1);
    let received = trace_rendered(&payload);

    assert_eq!(received, payload);
    assert!(!received.ends_with(TRUNCATION_MARKER));
}

#[test]
fn trace_one_byte_over_is_truncated_with_marker() {
    let payload = "q".repeat(MESSAGE_CAPACITY);
    let received = trace_rendered(&payload);

    assert_eq!(received.len(), MESSAGE_CAPACITY - 1);
    let kept = MESSAGE_CAPACITY - 1 - TRUNCATION_MARKER.len();
    assert_eq!(received, format!("{}{}", "q".repeat(kept), TRUNCATION_MARKER));
}
