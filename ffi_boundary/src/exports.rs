//! Module containing the FFI exports for plain functions.
//! These are using the C ABI and are intended to be used by other languages.
//!
//! Strings returned from here are handles; see [`crate::strings`].

use crate::callee;
use crate::strings::{borrow_str, transfer};
use std::ffi::c_char;

/// Call a function that takes nothing and returns nothing.
#[no_mangle]
pub extern "C" fn simple_function() {
    boundary_call!("simple_function", |_call| {
        callee::simple_function();
        Ok(())
    })
}

/// Call a function with primitive arguments, passed by value.
///
/// Parameters:
/// - `i`: any 32-bit integer.
/// - `b`: a C `bool` (0 or 1).
#[no_mangle]
pub extern "C" fn function_with_primitive_args(i: i32, b: bool) {
    boundary_call!("function_with_primitive_args", |_call| {
        callee::function_with_primitive_args(i, b);
        Ok(())
    })
}

/// Call a function with a string argument.
///
/// Parameters:
/// - `s`: NUL-terminated UTF-8. Borrowed for the duration of the call.
///
/// # Safety
///
/// `s` must point at a NUL-terminated buffer valid for the whole call.
#[no_mangle]
pub unsafe extern "C" fn function_with_string_arg(s: *const c_char) {
    boundary_call!("function_with_string_arg", |call| {
        let s = unsafe { borrow_str(s, call, "s") }?;
        callee::function_with_string_arg(s.to_owned());
        Ok(())
    })
}

/// Call a function with primitive and string arguments, in that order.
///
/// # Safety
///
/// `s` must point at a NUL-terminated buffer valid for the whole call.
#[no_mangle]
pub unsafe extern "C" fn function_with_primitive_and_string_arg(i: i32, b: bool, s: *const c_char) {
    boundary_call!("function_with_primitive_and_string_arg", |call| {
        let s = unsafe { borrow_str(s, call, "s") }?;
        callee::function_with_primitive_and_string_arg(i, b, s.to_owned());
        Ok(())
    })
}

/// Call a function returning a primitive. The value is a plain copy.
#[no_mangle]
pub extern "C" fn function_return_primitive() -> i32 {
    boundary_call!("function_return_primitive", |_call| Ok(
        callee::function_return_primitive()
    ))
}

/// Call a function returning a string.
///
/// Return values:
/// - A string handle. The caller owns it and must release it with
///   `rust_string_drop`.
#[no_mangle]
pub extern "C" fn function_return_string() -> i64 {
    boundary_call!("function_return_string", |call| {
        transfer(callee::function_return_string(), call)
    })
}

/// Pick one of two strings.
///
/// Parameters:
/// - `str1`, `str2`: NUL-terminated UTF-8, borrowed for the call.
/// - `b`: true selects `str1`, false selects `str2`.
///
/// Return values:
/// - A string handle owned by the caller (release with `rust_string_drop`).
///
/// # Safety
///
/// `str1` and `str2` must point at NUL-terminated buffers valid for the
/// whole call.
#[no_mangle]
pub unsafe extern "C" fn combo_function(str1: *const c_char, str2: *const c_char, b: bool) -> i64 {
    boundary_call!("combo_function", |call| {
        let str1 = unsafe { borrow_str(str1, call, "str1") }?;
        let str2 = unsafe { borrow_str(str2, call, "str2") }?;
        transfer(callee::combo_function(str1.to_owned(), str2.to_owned(), b), call)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callee::{take_observed, ObservedCall};
    use crate::strings::rust_string_drop;
    use std::ffi::CString;

    #[test]
    fn string_argument_is_copied_not_retained() {
        let arg = CString::new("Hello, World!").unwrap();
        unsafe { function_with_string_arg(arg.as_ptr()) };
        drop(arg);
        assert_eq!(
            take_observed(),
            Some(ObservedCall::StringArg {
                s: "Hello, World!".to_string()
            })
        );
    }

    #[test]
    fn argument_order_is_preserved() {
        let arg = CString::new("Complex function!").unwrap();
        unsafe { function_with_primitive_and_string_arg(42, false, arg.as_ptr()) };
        assert_eq!(
            take_observed(),
            Some(ObservedCall::PrimitiveAndStringArg {
                i: 42,
                b: false,
                s: "Complex function!".to_string()
            })
        );
    }

    #[test]
    fn returned_string_is_a_live_handle() {
        let handle = function_return_string();
        let len = crate::strings::rust_string_len(handle);
        assert_eq!(len, "String returned from Rust".len());
        rust_string_drop(handle);
    }

    #[test]
    fn simple_function_is_observed() {
        simple_function();
        assert_eq!(take_observed(), Some(ObservedCall::Simple));
        assert_eq!(function_return_primitive(), 42);
    }
}
