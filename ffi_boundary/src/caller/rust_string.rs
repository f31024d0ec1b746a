use crate::errors::{violation, BoundaryError};
use crate::strings::{rust_string_data, rust_string_drop, rust_string_len};
use std::fmt;

/// A string returned across the boundary. Owns its handle and releases
/// it on drop.
#[derive(Debug)]
pub struct RustString {
    handle: i64,
}

impl RustString {
    /// Take ownership of a handle returned by a string-returning export.
    pub(crate) fn from_handle(handle: i64) -> Self {
        Self { handle }
    }

    /// The raw handle. Still owned by `self`.
    pub fn handle(&self) -> i64 {
        self.handle
    }

    /// Borrow the contents. Valid for as long as `self` is.
    pub fn as_str(&self) -> &str {
        let len = rust_string_len(self.handle);
        let data = rust_string_data(self.handle);
        // The bytes stay put until rust_string_drop, which only Drop calls.
        let bytes = unsafe { std::slice::from_raw_parts(data, len) };
        std::str::from_utf8(bytes).unwrap_or_else(|source| {
            violation(BoundaryError::InvalidUtf8 {
                call: "rust_string_data",
                arg: "return value",
                source,
            })
        })
    }
}

impl fmt::Display for RustString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for RustString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl Drop for RustString {
    fn drop(&mut self) {
        rust_string_drop(self.handle);
    }
}
