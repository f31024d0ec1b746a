//! Smoke test for the boundary: runs the same sequence a host runtime's
//! test suite does, then a release stress loop and a multi-threaded run.
//! Exits non-zero if anything comes back wrong or a handle leaks.

use anyhow::{ensure, Context, Result};
use ffi_boundary::caller::{self, TestStruct, TestStruct2};
use futures::future::try_join_all;
use std::sync::{Arc, Mutex};

const STRESS_ITERATIONS: usize = 10_000;
const WORKERS: i32 = 8;

#[tokio::main]
async fn main() -> Result<()> {
    ensure!(ffi_boundary::setup_default() == 0, "Logging setup failed");

    println!("FFI Test Suite");
    functions()?;
    structs()?;
    stress()?;
    concurrent().await?;

    let leaked = ffi_boundary::shutdown();
    ensure!(leaked == 0, "{leaked} handles were never released");
    println!("All checks passed.");
    Ok(())
}

fn functions() -> Result<()> {
    caller::simple_function();
    println!("simple_function called");

    println!("Calling function_with_primitive_args");
    caller::function_with_primitive_args(1, true);

    println!("Calling function_with_string_arg");
    caller::function_with_string_arg("Hello, World!")?;

    println!("Calling function_with_primitive_and_string_arg");
    caller::function_with_primitive_and_string_arg(1, false, "Hello, World!")?;

    println!("Calling function_return_primitive");
    let primitive_result = caller::function_return_primitive();
    println!("Primitive result: {primitive_result}");
    ensure!(primitive_result == 42, "Expected 42, got {primitive_result}");

    println!("Calling function_return_string");
    let str_result = caller::function_return_string();
    println!("{str_result}");
    ensure!(str_result.as_str() == "String returned from Rust", "Corrupted string: {str_result:?}");

    let combo = caller::combo_function("Combo!", "Don't print me", true)?;
    println!("{combo}");
    ensure!(combo.as_str() == "Combo!", "combo_function picked the wrong string");
    Ok(())
}

fn structs() -> Result<()> {
    println!("Creating a struct");
    let mut s = TestStruct::new();

    let i32_field = s.i32_field();
    println!("i32_field: {i32_field}");
    ensure!(i32_field == 0, "Default i32_field should be 0");

    s.set_i32_field(42);
    println!("i32_field: {}", s.i32_field());
    ensure!(s.i32_field() == 42, "Set did not stick");

    println!("bool_field: {}", s.bool_field());

    println!("Empty string: {}", s.string_field());
    for text in ["Hello, World!", "Hello, Rust!"] {
        s.set_string_field(text)?;
        let stored = s.string_field();
        println!("{stored}");
        ensure!(stored.as_str() == text, "string_field round trip failed");
    }

    let mut inner = s.struct_field();
    inner.set_i32_field(43);
    println!("{}", inner.i32_field());

    let mut other = TestStruct2::new();
    other.set_i32_field(44);
    s.set_struct_field(&other);
    let nested = s.struct_field().i32_field();
    println!("struct setter test: {nested}");
    ensure!(nested == 44, "struct_field setter failed");
    Ok(())
}

fn stress() -> Result<()> {
    println!("Returning and releasing {STRESS_ITERATIONS} strings");
    let before = ffi_boundary::live_handle_count();
    for _ in 0..STRESS_ITERATIONS {
        let s = caller::function_return_string();
        ensure!(!s.as_str().is_empty(), "Empty string returned");
    }
    let after = ffi_boundary::live_handle_count();
    tracing::info!(iterations = STRESS_ITERATIONS, before, after, "Stress loop finished");
    ensure!(before == after, "Live handles grew from {before} to {after}");
    Ok(())
}

/// Each worker owns its own struct; one struct is shared behind a
/// mutex, since the boundary does not serialize writers for us.
async fn concurrent() -> Result<()> {
    println!("Running {WORKERS} workers");
    let shared = Arc::new(Mutex::new(TestStruct::new()));

    let workers = (0..WORKERS).map(|id| {
        let shared = shared.clone();
        tokio::task::spawn_blocking(move || -> Result<i32> {
            let mut own = TestStruct::new();
            own.set_i32_field(id);
            ensure!(own.i32_field() == id, "Worker {id} saw another worker's write");

            let mut guard = shared
                .lock()
                .map_err(|_| anyhow::anyhow!("Shared struct lock poisoned"))?;
            let total = guard.i32_field() + id;
            guard.set_i32_field(total);
            Ok(id)
        })
    });

    let ids = try_join_all(workers).await.context("Worker panicked")?;
    for id in ids {
        id?;
    }

    let expected: i32 = (0..WORKERS).sum();
    let total = shared
        .lock()
        .map_err(|_| anyhow::anyhow!("Shared struct lock poisoned"))?
        .i32_field();
    ensure!(total == expected, "Shared total {total}, expected {expected}");
    Ok(())
}
