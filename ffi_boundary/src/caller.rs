//! Safe caller-side bindings. This is the shape generated host bindings
//! take (a Swift or C++ class per type, a wrapper per function), written
//! in Rust against the exported C ABI.
//!
//! Releasing is tied to scope: [`RustString`], [`TestStruct`] and
//! [`TestStruct2`] give their handles back in `Drop`, so a handle can be
//! neither leaked by forgetting nor released twice.

mod rust_string;
mod test_struct;

use crate::errors::{BoundaryError, Result};
use crate::exports;
use std::ffi::CString;

pub use rust_string::RustString;
pub use test_struct::{TestStruct, TestStruct2};

/// Turn a Rust string into a C string argument.
pub(crate) fn c_arg(value: &str, call: &'static str, arg: &'static str) -> Result<CString> {
    CString::new(value).map_err(|source| BoundaryError::InteriorNul { call, arg, source })
}

/// See [`exports::simple_function`].
pub fn simple_function() {
    exports::simple_function()
}

/// See [`exports::function_with_primitive_args`].
pub fn function_with_primitive_args(i: i32, b: bool) {
    exports::function_with_primitive_args(i, b)
}

/// See [`exports::function_with_string_arg`].
pub fn function_with_string_arg(s: &str) -> Result<()> {
    let s = c_arg(s, "function_with_string_arg", "s")?;
    unsafe { exports::function_with_string_arg(s.as_ptr()) };
    Ok(())
}

/// See [`exports::function_with_primitive_and_string_arg`].
pub fn function_with_primitive_and_string_arg(i: i32, b: bool, s: &str) -> Result<()> {
    let s = c_arg(s, "function_with_primitive_and_string_arg", "s")?;
    unsafe { exports::function_with_primitive_and_string_arg(i, b, s.as_ptr()) };
    Ok(())
}

/// See [`exports::function_return_primitive`].
pub fn function_return_primitive() -> i32 {
    exports::function_return_primitive()
}

/// See [`exports::function_return_string`].
pub fn function_return_string() -> RustString {
    RustString::from_handle(exports::function_return_string())
}

/// See [`exports::combo_function`].
pub fn combo_function(str1: &str, str2: &str, b: bool) -> Result<RustString> {
    let str1 = c_arg(str1, "combo_function", "str1")?;
    let str2 = c_arg(str2, "combo_function", "str2")?;
    let handle = unsafe { exports::combo_function(str1.as_ptr(), str2.as_ptr(), b) };
    Ok(RustString::from_handle(handle))
}
