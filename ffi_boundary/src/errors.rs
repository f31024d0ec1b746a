//! Boundary violations. None of these are recoverable: they mean the
//! binding code on one side or the other broke the calling contract.
//! Internal code returns them as `Result`s; the exported shims turn
//! them into a logged abort through [`boundary_call!`].

use crate::handles::HandleKind;
use std::ffi::NulError;
use std::str::Utf8Error;

/// Result type used throughout the boundary.
pub type Result<T, E = BoundaryError> = std::result::Result<T, E>;

/// Everything that can go wrong when crossing the boundary. Every
/// variant names the exported call it was detected in.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    /// A pointer argument was null.
    #[error("{call}: argument `{arg}` is a null pointer")]
    NullArgument {
        /// Exported call.
        call: &'static str,
        /// Parameter name.
        arg: &'static str,
    },

    /// A string argument was not UTF-8.
    #[error("{call}: argument `{arg}` is not valid UTF-8")]
    InvalidUtf8 {
        /// Exported call.
        call: &'static str,
        /// Parameter name.
        arg: &'static str,
        /// Where decoding failed.
        #[source]
        source: Utf8Error,
    },

    /// A string could not be passed as a C string because it contains NUL.
    #[error("{call}: argument `{arg}` contains an interior NUL byte")]
    InteriorNul {
        /// Exported call.
        call: &'static str,
        /// Parameter name.
        arg: &'static str,
        /// Position of the NUL.
        #[source]
        source: NulError,
    },

    /// The handle was never issued by this library.
    #[error("{call}: handle {handle:#x} was never issued")]
    UnknownHandle {
        /// Exported call.
        call: &'static str,
        /// The handle as passed in.
        handle: i64,
    },

    /// The handle belongs to a different type.
    #[error("{call}: handle {handle:#x} is a {found} handle, expected {expected}")]
    WrongKind {
        /// Exported call.
        call: &'static str,
        /// The handle as passed in.
        handle: i64,
        /// Kind the call accepts.
        expected: HandleKind,
        /// Kind tagged on the handle.
        found: HandleKind,
    },

    /// The handle was issued, then released. Covers both use-after-free
    /// and double release.
    #[error("{call}: {kind} handle {handle:#x} has already been released")]
    Released {
        /// Exported call.
        call: &'static str,
        /// Kind of the released handle.
        kind: HandleKind,
        /// The handle as passed in.
        handle: i64,
    },

    /// Too many live handles of one kind. Almost always a caller leak.
    #[error(
        "{call}: {kind} handle limit of {limit} live handles reached \
         (are handles being released?)"
    )]
    HandleLimit {
        /// Exported call.
        call: &'static str,
        /// Table that is full.
        kind: HandleKind,
        /// Configured cap.
        limit: usize,
    },
}

/// Broad classes of violation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display)]
pub enum ViolationClass {
    /// Wrong pointer, wrong encoding, wrong handle type.
    Contract,
    /// Handle used outside its lifetime, or never released.
    Lifetime,
}

impl BoundaryError {
    /// Name of the exported call the violation was detected in.
    pub fn call(&self) -> &'static str {
        match self {
            Self::NullArgument { call, .. }
            | Self::InvalidUtf8 { call, .. }
            | Self::InteriorNul { call, .. }
            | Self::UnknownHandle { call, .. }
            | Self::WrongKind { call, .. }
            | Self::Released { call, .. }
            | Self::HandleLimit { call, .. } => call,
        }
    }

    /// Which class of violation this is.
    pub fn class(&self) -> ViolationClass {
        match self {
            Self::NullArgument { .. }
            | Self::InvalidUtf8 { .. }
            | Self::InteriorNul { .. }
            | Self::UnknownHandle { .. }
            | Self::WrongKind { .. } => ViolationClass::Contract,
            Self::Released { .. } | Self::HandleLimit { .. } => ViolationClass::Lifetime,
        }
    }
}

/// Report a violation and abort. Unwinding across `extern "C"` is not
/// an option, and carrying on after a contract break is worse.
#[cold]
pub fn violation(err: BoundaryError) -> ! {
    tracing::error!(call = err.call(), class = %err.class(), "boundary violation: {err}");
    eprintln!("(RUST) fatal boundary violation: {err}");
    std::process::abort()
}

/// Run the body of an exported function. The body is a closure
/// returning [`Result`]; `?` works inside it. Errors abort via
/// [`violation`].
///
/// ```ignore
/// boundary_call!("TestStruct__drop", |call| {
///     TEST_STRUCTS.release(RawHandle(handle), call)?;
///     Ok(())
/// })
/// ```
macro_rules! boundary_call {
    ($name: literal, |$call: ident| $body: expr) => {{
        let $call: &'static str = $name;
        let _span = tracing::trace_span!("boundary_call", call = $call).entered();
        let result = (|| -> $crate::errors::Result<_> { $body })();
        match result {
            Ok(value) => value,
            Err(err) => $crate::errors::violation(err),
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_call_and_argument() {
        let err = BoundaryError::NullArgument {
            call: "function_with_string_arg",
            arg: "s",
        };
        assert_eq!(
            err.to_string(),
            "function_with_string_arg: argument `s` is a null pointer"
        );
        assert_eq!(err.call(), "function_with_string_arg");
    }

    #[test]
    fn released_handles_are_lifetime_violations() {
        let err = BoundaryError::Released {
            call: "TestStruct__get_i32_field",
            kind: HandleKind::TestStruct,
            handle: 0x0200_0000_0000_0001,
        };
        assert_eq!(err.class(), ViolationClass::Lifetime);
        assert!(err.to_string().contains("TestStruct handle 0x200000000000001"));
    }

    #[test]
    fn wrong_kind_is_a_contract_violation() {
        let err = BoundaryError::WrongKind {
            call: "rust_string_len",
            handle: 0x0200_0000_0000_0001,
            expected: HandleKind::RustString,
            found: HandleKind::TestStruct,
        };
        assert_eq!(err.class(), ViolationClass::Contract);
        assert!(err.to_string().contains("expected RustString"));
    }
}
