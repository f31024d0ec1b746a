use super::{c_arg, RustString};
use crate::aggregate::{
    test_struct2_clone, test_struct2_default, test_struct2_drop, test_struct2_get_i32_field,
    test_struct2_set_i32_field, test_struct_clone, test_struct_default, test_struct_drop,
    test_struct_get_bool_field, test_struct_get_i32_field, test_struct_get_string_field,
    test_struct_get_struct_field, test_struct_set_i32_field, test_struct_set_string_field,
    test_struct_set_struct_field,
};
use crate::errors::Result;

/// Caller-side `TestStruct`. Owns one handle; cloning goes through the
/// boundary and yields a second, independent handle.
#[derive(Debug)]
pub struct TestStruct {
    handle: i64,
}

impl TestStruct {
    /// Construct with every field at its default.
    pub fn new() -> Self {
        Self {
            handle: test_struct_default(),
        }
    }

    /// The raw handle. Still owned by `self`.
    pub fn handle(&self) -> i64 {
        self.handle
    }

    /// Read `i32_field`.
    pub fn i32_field(&self) -> i32 {
        test_struct_get_i32_field(self.handle)
    }

    /// Write `i32_field`.
    pub fn set_i32_field(&mut self, value: i32) {
        test_struct_set_i32_field(self.handle, value)
    }

    /// Read `bool_field`. There is no setter.
    pub fn bool_field(&self) -> bool {
        test_struct_get_bool_field(self.handle)
    }

    /// A copy of `string_field`.
    pub fn string_field(&self) -> RustString {
        RustString::from_handle(test_struct_get_string_field(self.handle))
    }

    /// Replace `string_field`.
    pub fn set_string_field(&mut self, value: &str) -> Result<()> {
        let value = c_arg(value, "TestStruct__set_string_field", "value")?;
        unsafe { test_struct_set_string_field(self.handle, value.as_ptr()) };
        Ok(())
    }

    /// A copy of `struct_field`. Changing it does not change `self`.
    pub fn struct_field(&self) -> TestStruct2 {
        TestStruct2 {
            handle: test_struct_get_struct_field(self.handle),
        }
    }

    /// Replace `struct_field` with a copy of `value`.
    pub fn set_struct_field(&mut self, value: &TestStruct2) {
        test_struct_set_struct_field(self.handle, value.handle)
    }
}

impl Default for TestStruct {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TestStruct {
    fn clone(&self) -> Self {
        Self {
            handle: test_struct_clone(self.handle),
        }
    }
}

impl Drop for TestStruct {
    fn drop(&mut self) {
        test_struct_drop(self.handle);
    }
}

/// Caller-side `TestStruct2`.
#[derive(Debug)]
pub struct TestStruct2 {
    handle: i64,
}

impl TestStruct2 {
    /// Construct with `i32_field` at zero.
    pub fn new() -> Self {
        Self {
            handle: test_struct2_default(),
        }
    }

    /// Read `i32_field`.
    pub fn i32_field(&self) -> i32 {
        test_struct2_get_i32_field(self.handle)
    }

    /// Write `i32_field`.
    pub fn set_i32_field(&mut self, value: i32) {
        test_struct2_set_i32_field(self.handle, value)
    }
}

impl Default for TestStruct2 {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TestStruct2 {
    fn clone(&self) -> Self {
        Self {
            handle: test_struct2_clone(self.handle),
        }
    }
}

impl Drop for TestStruct2 {
    fn drop(&mut self) {
        test_struct2_drop(self.handle);
    }
}
