#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]

//! A C ABI marshalling boundary. This crate exposes a small set of
//! functions, strings and opaque aggregates to a foreign host runtime
//! (Swift, C++, C#, ...) and pins down who owns what after each call.
//!
//! - Primitives cross by value.
//! - String arguments are borrowed for the duration of the call only.
//! - Returned strings are handed over as handles, released with
//!   `rust_string_drop`.
//! - Aggregates live in Rust and are reached through handles, released
//!   with `<Type>__drop`.
//!
//! Misuse (null pointers, bad UTF-8, stale or foreign handles) is a
//! programmer error: it is logged and the process aborts.

#[macro_use]
pub mod errors;
pub mod aggregate;
pub mod callee;
pub mod caller;
pub mod config;
pub mod exports;
pub mod handles;
pub mod lifecycle;
pub mod strings;

pub use errors::{BoundaryError, Result, ViolationClass};
pub use exports::{
    combo_function, function_return_primitive, function_return_string,
    function_with_primitive_and_string_arg, function_with_primitive_args,
    function_with_string_arg, simple_function,
};
pub use lifecycle::{live_handle_count, setup, setup_default, shutdown, LogFormat};
pub use strings::{rust_string_data, rust_string_drop, rust_string_len};
