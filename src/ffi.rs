//! FFI bindings for Rep Flux
//!
//! This module provides C-compatible functions for driving an exercise engine
//! from other languages. Frames go in and results come out as JSON. All
//! returned strings are allocated and must be freed by the caller using
//! `repflux_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::Arc;

use crate::definition::ExerciseDefinition;
use crate::engine::ExerciseEngine;
use crate::error::EngineError;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

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

fn into_handle(result: Result<ExerciseEngine, EngineError>) -> *mut RepFluxEngineHandle {
    match result {
        Ok(engine) => Box::into_raw(Box::new(RepFluxEngineHandle { engine })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Engine API
// ============================================================================

/// Opaque handle to an ExerciseEngine
pub struct RepFluxEngineHandle {
    engine: ExerciseEngine,
}

/// Create an engine for a built-in exercise (`squat`, `pushup`, `bicep_curl`).
///
/// # Safety
/// - `key` must be a valid null-terminated C string.
/// - Must be freed with `repflux_engine_free`.
/// - Returns NULL on error; call `repflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn repflux_engine_builtin(key: *const c_char) -> *mut RepFluxEngineHandle {
    clear_last_error();

    let Some(key) = cstr_to_string(key) else {
        set_last_error("Invalid exercise key pointer");
        return ptr::null_mut();
    };

    into_handle(ExerciseEngine::builtin(&key))
}

/// Create an engine from a YAML exercise definition.
///
/// # Safety
/// - `yaml` must be a valid null-terminated C string.
/// - Must be freed with `repflux_engine_free`.
/// - Returns NULL on error; call `repflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn repflux_engine_from_yaml(yaml: *const c_char) -> *mut RepFluxEngineHandle {
    clear_last_error();

    let Some(yaml) = cstr_to_string(yaml) else {
        set_last_error("Invalid YAML string pointer");
        return ptr::null_mut();
    };

    into_handle(
        ExerciseDefinition::from_yaml_str(&yaml)
            .map(|definition| ExerciseEngine::new(Arc::new(definition))),
    )
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by a `repflux_engine_*` constructor, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn repflux_engine_free(engine: *mut RepFluxEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Process one landmark frame given as JSON and return the result as JSON.
///
/// A frame without a usable pose is not an error: the result carries a
/// non-`tracked` status instead.
///
/// # Safety
/// - `engine` must be a valid pointer returned by a `repflux_engine_*` constructor.
/// - `frame_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `repflux_free_string`.
/// - Returns NULL on error; call `repflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn repflux_engine_process(
    engine: *mut RepFluxEngineHandle,
    frame_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &mut *engine;

    let Some(frame_json) = cstr_to_string(frame_json) else {
        set_last_error("Invalid frame string pointer");
        return ptr::null_mut();
    };

    let result = handle
        .engine
        .process_json(&frame_json)
        .and_then(|result| serde_json::to_string(&result).map_err(EngineError::from));

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Reset the engine's counter and phase.
///
/// # Safety
/// - `engine` must be a valid pointer returned by a `repflux_engine_*` constructor.
/// - Returns 0 on success, -1 on a NULL engine.
#[no_mangle]
pub unsafe extern "C" fn repflux_engine_reset(engine: *mut RepFluxEngineHandle) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }

    (*engine).engine.reset();
    0
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Rep Flux functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Rep Flux function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn repflux_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Rep Flux function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn repflux_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Rep Flux library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn repflux_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
