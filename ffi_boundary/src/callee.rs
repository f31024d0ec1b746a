//! The Rust functions sitting behind the exports. They take and return
//! plain Rust types; all marshalling happens in [`crate::exports`].
//!
//! Each call is logged and remembered per thread, so whoever made the
//! call can check what actually arrived on this side.

use std::cell::RefCell;

/// What the callee saw on its most recent call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedCall {
    /// `simple_function()`
    Simple,
    /// `function_with_primitive_args(i, b)`
    #[allow(missing_docs)]
    PrimitiveArgs { i: i32, b: bool },
    /// `function_with_string_arg(s)`
    #[allow(missing_docs)]
    StringArg { s: String },
    /// `function_with_primitive_and_string_arg(i, b, s)`
    #[allow(missing_docs)]
    PrimitiveAndStringArg { i: i32, b: bool, s: String },
    /// `combo_function(str1, str2, b)`
    #[allow(missing_docs)]
    Combo { str1: String, str2: String, b: bool },
}

thread_local! {
    static LAST_CALL: RefCell<Option<ObservedCall>> = const { RefCell::new(None) };
}

fn observe(call: ObservedCall) {
    tracing::debug!(?call, "callee invoked");
    LAST_CALL.with(|last| *last.borrow_mut() = Some(call));
}

/// Take the last call observed on this thread, clearing it.
pub fn take_observed() -> Option<ObservedCall> {
    LAST_CALL.with(|last| last.borrow_mut().take())
}

/// No arguments, no result.
pub fn simple_function() {
    observe(ObservedCall::Simple);
}

/// Primitive arguments only.
pub fn function_with_primitive_args(i: i32, b: bool) {
    observe(ObservedCall::PrimitiveArgs { i, b });
}

/// A single string argument.
pub fn function_with_string_arg(s: String) {
    observe(ObservedCall::StringArg { s });
}

/// Primitives followed by a string.
pub fn function_with_primitive_and_string_arg(i: i32, b: bool, s: String) {
    observe(ObservedCall::PrimitiveAndStringArg { i, b, s });
}

/// Always 42.
pub fn function_return_primitive() -> i32 {
    42
}

/// A freshly allocated string.
pub fn function_return_string() -> String {
    "String returned from Rust".to_string()
}

/// `str1` if `b`, otherwise `str2`.
pub fn combo_function(str1: String, str2: String, b: bool) -> String {
    observe(ObservedCall::Combo {
        str1: str1.clone(),
        str2: str2.clone(),
        b,
    });
    if b {
        str1
    } else {
        str2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observations_are_taken_once() {
        function_with_primitive_args(-7, true);
        assert_eq!(take_observed(), Some(ObservedCall::PrimitiveArgs { i: -7, b: true }));
        assert_eq!(take_observed(), None);
    }

    #[test]
    fn combo_picks_by_flag() {
        assert_eq!(combo_function("a".into(), "b".into(), true), "a");
        assert_eq!(combo_function("a".into(), "b".into(), false), "b");
    }
}
