//! Returned strings must not pile up when the caller releases them.
//! Kept as the only test in its binary so the live count is not shared
//! with anything else.

use ffi_boundary::caller;
use ffi_boundary::{function_return_string, live_handle_count, rust_string_drop, shutdown};

const ITERATIONS: usize = 10_000;

#[test]
fn repeated_return_and_release_does_not_grow() {
    let baseline = live_handle_count();

    for _ in 0..ITERATIONS {
        let handle = function_return_string();
        rust_string_drop(handle);
    }
    assert_eq!(live_handle_count(), baseline);

    for i in 0..ITERATIONS {
        let s = caller::combo_function("left", "right", i % 2 == 0).expect("no NUL in arguments");
        assert!(s.as_str() == "left" || s.as_str() == "right");
    }
    assert_eq!(live_handle_count(), baseline);

    {
        let _held = caller::function_return_string();
        assert_eq!(shutdown(), baseline + 1);
    }
    assert_eq!(shutdown(), baseline);
}
