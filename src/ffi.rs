//! FFI bindings for Kinesic
//!
//! This module provides C-compatible functions for calling Kinesic from other
//! languages. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using
//! `kinesic_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{analyze_frames_ndjson, FrameAnalyzer};
use crate::schema::FrameObservation;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Helper to convert a Vec<String> of JSON payloads to a JSON array string
fn vec_to_json_array(vec: Vec<String>) -> String {
    let elements: Vec<&str> = vec.iter().map(|s| s.as_str()).collect();
    format!("[{}]", elements.join(","))
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyze a batch of NDJSON frames and return a JSON array of annotation
/// payloads.
///
/// # Safety
/// - `frames_ndjson` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `kinesic_free_string`.
/// - Returns NULL on error; call `kinesic_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn kinesic_analyze_frames(frames_ndjson: *const c_char) -> *mut c_char {
    clear_last_error();

    let input = match cstr_to_string(frames_ndjson) {
        Some(s) => s,
        None => {
            set_last_error("Invalid frames string pointer");
            return ptr::null_mut();
        }
    };

    match analyze_frames_ndjson(&input) {
        Ok(payloads) => string_to_cstr(&vec_to_json_array(payloads)),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful API
// ============================================================================

/// Create a new frame analyzer with default settings.
///
/// # Safety
/// The returned pointer must be freed with `kinesic_analyzer_free`.
#[no_mangle]
pub extern "C" fn kinesic_analyzer_new() -> *mut FrameAnalyzer {
    Box::into_raw(Box::new(FrameAnalyzer::new()))
}

/// Free an analyzer created by `kinesic_analyzer_new`.
///
/// # Safety
/// `analyzer` must be a pointer returned by `kinesic_analyzer_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn kinesic_analyzer_free(analyzer: *mut FrameAnalyzer) {
    if !analyzer.is_null() {
        drop(Box::from_raw(analyzer));
    }
}

/// Analyze one frame JSON with persistent tracker state and return the
/// annotation payload JSON.
///
/// # Safety
/// - `analyzer` must be a valid pointer from `kinesic_analyzer_new`.
/// - `frame_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `kinesic_free_string`; NULL on error.
#[no_mangle]
pub unsafe extern "C" fn kinesic_analyzer_analyze(
    analyzer: *mut FrameAnalyzer,
    frame_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let analyzer = match analyzer.as_mut() {
        Some(a) => a,
        None => {
            set_last_error("Invalid analyzer pointer");
            return ptr::null_mut();
        }
    };

    let input = match cstr_to_string(frame_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid frame string pointer");
            return ptr::null_mut();
        }
    };

    let frame: FrameObservation = match serde_json::from_str(&input) {
        Ok(f) => f,
        Err(e) => {
            set_last_error(&format!("Failed to parse frame: {}", e));
            return ptr::null_mut();
        }
    };

    if let Err(e) = frame.validate() {
        set_last_error(&e.to_string());
        return ptr::null_mut();
    }

    match analyzer.analyze_to_json(&frame) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Save the analyzer's tracker state as JSON.
///
/// # Safety
/// - `analyzer` must be a valid pointer from `kinesic_analyzer_new`.
/// - Returns a newly allocated string that must be freed with
///   `kinesic_free_string`; NULL on error.
#[no_mangle]
pub unsafe extern "C" fn kinesic_analyzer_save_state(
    analyzer: *const FrameAnalyzer,
) -> *mut c_char {
    clear_last_error();

    let analyzer = match analyzer.as_ref() {
        Some(a) => a,
        None => {
            set_last_error("Invalid analyzer pointer");
            return ptr::null_mut();
        }
    };

    match analyzer.save_state() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Load tracker state JSON into the analyzer. Returns 0 on success, -1 on
/// error.
///
/// # Safety
/// - `analyzer` must be a valid pointer from `kinesic_analyzer_new`.
/// - `state_json` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn kinesic_analyzer_load_state(
    analyzer: *mut FrameAnalyzer,
    state_json: *const c_char,
) -> i32 {
    clear_last_error();

    let analyzer = match analyzer.as_mut() {
        Some(a) => a,
        None => {
            set_last_error("Invalid analyzer pointer");
            return -1;
        }
    };

    let input = match cstr_to_string(state_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid state string pointer");
            return -1;
        }
    };

    match analyzer.load_state(&input) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Error handling and memory management
// ============================================================================

/// Get the last error message, or NULL when no error is recorded.
///
/// The returned pointer is owned by the library and valid until the next
/// Kinesic call on this thread; do not free it.
#[no_mangle]
pub extern "C" fn kinesic_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(msg) => msg.as_ptr(),
        None => ptr::null(),
    })
}

/// Free a string returned by a Kinesic function.
///
/// # Safety
/// `s` must be a pointer returned by a Kinesic function, or NULL.
#[no_mangle]
pub unsafe extern "C" fn kinesic_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
