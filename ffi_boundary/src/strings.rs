//! Strings are the error-prone part of any FFI, so both directions go
//! through here.
//!
//! - In: the host passes a NUL-terminated UTF-8 `const char*`. It is
//!   borrowed for the call; anything kept is copied first.
//! - Out: Rust parks the `String` in a handle table and returns the
//!   handle. The host reads it with [`rust_string_data`] and
//!   [`rust_string_len`], then owes exactly one [`rust_string_drop`].

use crate::config::config;
use crate::errors::{BoundaryError, Result};
use crate::handles::{HandleKind, HandleTable, RawHandle};
use once_cell::sync::Lazy;
use std::ffi::{c_char, CStr};

/// Strings handed over to the host and not yet released.
pub(crate) static RUST_STRINGS: Lazy<HandleTable<String>> =
    Lazy::new(|| HandleTable::new(HandleKind::RustString, config().handles.max_live_strings));

/// Borrow a host string argument for the duration of a call.
///
/// # Safety
///
/// `ptr` must be null or point at a NUL-terminated buffer that stays
/// valid and unmodified for `'a`.
pub unsafe fn borrow_str<'a>(
    ptr: *const c_char,
    call: &'static str,
    arg: &'static str,
) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(BoundaryError::NullArgument { call, arg });
    }
    let c_str = unsafe { CStr::from_ptr(ptr) };
    c_str
        .to_str()
        .map_err(|source| BoundaryError::InvalidUtf8 { call, arg, source })
}

/// Hand `value` over to the host. Ownership passes to the caller along
/// with the returned handle.
pub(crate) fn transfer(value: String, call: &'static str) -> Result<i64> {
    Ok(RUST_STRINGS.insert(value, call)?.0)
}

/// Pointer to the UTF-8 bytes of a returned string. The bytes are
/// *not* NUL-terminated; pair with [`rust_string_len`]. The pointer is
/// valid until the handle is dropped.
#[no_mangle]
pub extern "C" fn rust_string_data(handle: i64) -> *const u8 {
    boundary_call!("rust_string_data", |call| {
        RUST_STRINGS.with(RawHandle(handle), call, |s| s.as_ptr())
    })
}

/// Length in bytes of a returned string.
#[no_mangle]
pub extern "C" fn rust_string_len(handle: i64) -> usize {
    boundary_call!("rust_string_len", |call| {
        RUST_STRINGS.with(RawHandle(handle), call, String::len)
    })
}

/// Release a returned string. Must be called exactly once per handle.
#[no_mangle]
pub extern "C" fn rust_string_drop(handle: i64) {
    boundary_call!("rust_string_drop", |call| {
        RUST_STRINGS.release(RawHandle(handle), call)?;
        Ok(())
    })
}
