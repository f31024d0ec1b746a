//! Opaque aggregates. The host never sees the layout of these structs:
//! it gets a handle from `<Type>__default`, reads and writes fields
//! through accessor exports, and gives the handle back with
//! `<Type>__drop`.
//!
//! Field access copies. Getting a string or struct field hands the
//! caller a new handle to a copy; setting one copies the caller's value
//! in. No handle ever aliases storage inside another.

use crate::config::config;
use crate::handles::{HandleKind, HandleTable, RawHandle};
use crate::strings::{borrow_str, transfer};
use once_cell::sync::Lazy;
use std::ffi::c_char;

/// The aggregate exercised by the smoke test.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TestStruct {
    /// Exported with getter and setter.
    pub i32_field: i32,
    /// Exported with a getter only.
    pub bool_field: bool,
    /// Exported with getter and setter; crosses as a string handle.
    pub string_field: String,
    /// Not exported at all.
    pub _skip_field: i32,
    /// Exported with getter and setter; crosses as a `TestStruct2` handle.
    pub struct_field: TestStruct2,
}

/// A nested aggregate, also usable on its own.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TestStruct2 {
    /// Exported with getter and setter.
    pub i32_field: i32,
}

pub(crate) static TEST_STRUCTS: Lazy<HandleTable<TestStruct>> =
    Lazy::new(|| HandleTable::new(HandleKind::TestStruct, config().handles.max_live_structs));

pub(crate) static TEST_STRUCTS_2: Lazy<HandleTable<TestStruct2>> =
    Lazy::new(|| HandleTable::new(HandleKind::TestStruct2, config().handles.max_live_structs));

/// Create a default `TestStruct` (all fields zero or empty).
///
/// Return values:
/// - A handle owned by the caller; destroy it with `TestStruct__drop`.
#[export_name = "TestStruct__default"]
pub extern "C" fn test_struct_default() -> i64 {
    boundary_call!("TestStruct__default", |call| {
        Ok(TEST_STRUCTS.insert(TestStruct::default(), call)?.0)
    })
}

/// Deep-copy a `TestStruct` into a new, independent handle.
#[export_name = "TestStruct__clone"]
pub extern "C" fn test_struct_clone(handle: i64) -> i64 {
    boundary_call!("TestStruct__clone", |call| {
        let copy = TEST_STRUCTS.get_cloned(RawHandle(handle), call)?;
        Ok(TEST_STRUCTS.insert(copy, call)?.0)
    })
}

/// Destroy a `TestStruct`. The handle is dead afterwards.
#[export_name = "TestStruct__drop"]
pub extern "C" fn test_struct_drop(handle: i64) {
    boundary_call!("TestStruct__drop", |call| {
        TEST_STRUCTS.release(RawHandle(handle), call)?;
        Ok(())
    })
}

/// Read `i32_field`.
#[export_name = "TestStruct__get_i32_field"]
pub extern "C" fn test_struct_get_i32_field(handle: i64) -> i32 {
    boundary_call!("TestStruct__get_i32_field", |call| {
        TEST_STRUCTS.with(RawHandle(handle), call, |s| s.i32_field)
    })
}

/// Write `i32_field`. Visible to later reads through this handle only.
#[export_name = "TestStruct__set_i32_field"]
pub extern "C" fn test_struct_set_i32_field(handle: i64, value: i32) {
    boundary_call!("TestStruct__set_i32_field", |call| {
        TEST_STRUCTS.with_mut(RawHandle(handle), call, |s| s.i32_field = value)
    })
}

/// Read `bool_field`.
#[export_name = "TestStruct__get_bool_field"]
pub extern "C" fn test_struct_get_bool_field(handle: i64) -> bool {
    boundary_call!("TestStruct__get_bool_field", |call| {
        TEST_STRUCTS.with(RawHandle(handle), call, |s| s.bool_field)
    })
}

/// Copy of `string_field`, as a string handle owned by the caller.
#[export_name = "TestStruct__get_string_field"]
pub extern "C" fn test_struct_get_string_field(handle: i64) -> i64 {
    boundary_call!("TestStruct__get_string_field", |call| {
        let value = TEST_STRUCTS.with(RawHandle(handle), call, |s| s.string_field.clone())?;
        transfer(value, call)
    })
}

/// Replace `string_field` with a copy of `value`.
///
/// # Safety
///
/// `value` must point at a NUL-terminated buffer valid for the whole call.
#[export_name = "TestStruct__set_string_field"]
pub unsafe extern "C" fn test_struct_set_string_field(handle: i64, value: *const c_char) {
    boundary_call!("TestStruct__set_string_field", |call| {
        let value = unsafe { borrow_str(value, call, "value") }?.to_owned();
        TEST_STRUCTS.with_mut(RawHandle(handle), call, |s| s.string_field = value)
    })
}

/// Copy of `struct_field`, as a new `TestStruct2` handle owned by the caller.
#[export_name = "TestStruct__get_struct_field"]
pub extern "C" fn test_struct_get_struct_field(handle: i64) -> i64 {
    boundary_call!("TestStruct__get_struct_field", |call| {
        let value = TEST_STRUCTS.with(RawHandle(handle), call, |s| s.struct_field.clone())?;
        Ok(TEST_STRUCTS_2.insert(value, call)?.0)
    })
}

/// Replace `struct_field` with a copy of the value behind `value`. The
/// caller keeps ownership of `value`.
#[export_name = "TestStruct__set_struct_field"]
pub extern "C" fn test_struct_set_struct_field(handle: i64, value: i64) {
    boundary_call!("TestStruct__set_struct_field", |call| {
        let value = TEST_STRUCTS_2.get_cloned(RawHandle(value), call)?;
        TEST_STRUCTS.with_mut(RawHandle(handle), call, |s| s.struct_field = value)
    })
}

/// Create a default `TestStruct2`.
#[export_name = "TestStruct2__default"]
pub extern "C" fn test_struct2_default() -> i64 {
    boundary_call!("TestStruct2__default", |call| {
        Ok(TEST_STRUCTS_2.insert(TestStruct2::default(), call)?.0)
    })
}

/// Deep-copy a `TestStruct2` into a new, independent handle.
#[export_name = "TestStruct2__clone"]
pub extern "C" fn test_struct2_clone(handle: i64) -> i64 {
    boundary_call!("TestStruct2__clone", |call| {
        let copy = TEST_STRUCTS_2.get_cloned(RawHandle(handle), call)?;
        Ok(TEST_STRUCTS_2.insert(copy, call)?.0)
    })
}

/// Destroy a `TestStruct2`.
#[export_name = "TestStruct2__drop"]
pub extern "C" fn test_struct2_drop(handle: i64) {
    boundary_call!("TestStruct2__drop", |call| {
        TEST_STRUCTS_2.release(RawHandle(handle), call)?;
        Ok(())
    })
}

/// Read `i32_field`.
#[export_name = "TestStruct2__get_i32_field"]
pub extern "C" fn test_struct2_get_i32_field(handle: i64) -> i32 {
    boundary_call!("TestStruct2__get_i32_field", |call| {
        TEST_STRUCTS_2.with(RawHandle(handle), call, |s| s.i32_field)
    })
}

/// Write `i32_field`.
#[export_name = "TestStruct2__set_i32_field"]
pub extern "C" fn test_struct2_set_i32_field(handle: i64, value: i32) {
    boundary_call!("TestStruct2__set_i32_field", |call| {
        TEST_STRUCTS_2.with_mut(RawHandle(handle), call, |s| s.i32_field = value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BoundaryError;
    use crate::strings::{rust_string_drop, rust_string_len};
    use std::ffi::CString;

    #[test]
    fn fields_start_at_default() {
        let h = test_struct_default();
        assert_eq!(test_struct_get_i32_field(h), 0);
        assert!(!test_struct_get_bool_field(h));
        let s = test_struct_get_string_field(h);
        assert_eq!(rust_string_len(s), 0);
        rust_string_drop(s);
        test_struct_drop(h);
    }

    #[test]
    fn set_then_get() {
        let h = test_struct_default();
        test_struct_set_i32_field(h, 42);
        assert_eq!(test_struct_get_i32_field(h), 42);
        test_struct_set_i32_field(h, i32::MIN);
        assert_eq!(test_struct_get_i32_field(h), i32::MIN);
        test_struct_drop(h);
    }

    #[test]
    fn clones_are_independent() {
        let a = test_struct_default();
        test_struct_set_i32_field(a, 1);
        let b = test_struct_clone(a);
        test_struct_set_i32_field(b, 2);
        assert_eq!(test_struct_get_i32_field(a), 1);
        assert_eq!(test_struct_get_i32_field(b), 2);
        test_struct_drop(a);
        test_struct_drop(b);
    }

    #[test]
    fn string_field_is_copied_in() {
        let h = test_struct_default();
        let value = CString::new("Hello, Rust!").unwrap();
        unsafe { test_struct_set_string_field(h, value.as_ptr()) };
        drop(value);
        let stored = TEST_STRUCTS
            .with(RawHandle(h), "test", |s| s.string_field.clone())
            .unwrap();
        assert_eq!(stored, "Hello, Rust!");
        test_struct_drop(h);
    }

    #[test]
    fn struct_field_crosses_as_a_copy() {
        let outer = test_struct_default();

        let inner = test_struct_get_struct_field(outer);
        test_struct2_set_i32_field(inner, 43);
        assert_eq!(test_struct2_get_i32_field(inner), 43);
        let field = TEST_STRUCTS
            .with(RawHandle(outer), "test", |s| s.struct_field.i32_field)
            .unwrap();
        assert_eq!(field, 0);

        let other = test_struct2_default();
        test_struct2_set_i32_field(other, 44);
        test_struct_set_struct_field(outer, other);
        test_struct2_set_i32_field(other, 45);

        let check = test_struct_get_struct_field(outer);
        assert_eq!(test_struct2_get_i32_field(check), 44);

        for h in [inner, other, check] {
            test_struct2_drop(h);
        }
        test_struct_drop(outer);
    }

    #[test]
    fn dropped_structs_are_dead() {
        let h = test_struct_default();
        test_struct_drop(h);
        let err = TEST_STRUCTS.with(RawHandle(h), "TestStruct__get_i32_field", |s| s.i32_field);
        assert!(matches!(err, Err(BoundaryError::Released { .. })));
        let err = TEST_STRUCTS.release(RawHandle(h), "TestStruct__drop");
        assert!(matches!(err, Err(BoundaryError::Released { .. })));
    }

    #[test]
    fn struct_handles_are_not_struct2_handles() {
        let h = test_struct_default();
        let err = TEST_STRUCTS_2.with(RawHandle(h), "TestStruct2__get_i32_field", |s| s.i32_field);
        assert!(matches!(
            err,
            Err(BoundaryError::WrongKind {
                expected: HandleKind::TestStruct2,
                found: HandleKind::TestStruct,
                ..
            })
        ));
        test_struct_drop(h);
    }
}
