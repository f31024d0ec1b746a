//! Logging setup, and the leak report at shutdown.

use crate::aggregate::{TEST_STRUCTS, TEST_STRUCTS_2};
use crate::config::config;
use crate::handles::LiveHandle;
use crate::strings::RUST_STRINGS;
use chrono::Utc;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use strum::FromRepr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log line format, as passed to [`setup`] by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromRepr, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum LogFormat {
    /// One line per event.
    Compact = 0,
    /// Multi-line, human oriented.
    Pretty = 1,
    /// One JSON object per event.
    Json = 2,
}

/// Return values of [`setup`].
#[repr(i32)]
enum SetupResult {
    Ok = 0,
    UnknownLogFormat = -1,
}

static ALREADY_SETUP: AtomicBool = AtomicBool::new(false);

/// Install logging. Optional: every other export works without it, they
/// just log nowhere. Calling it again is harmless.
///
/// Parameters:
/// - `log_format`: 0 = compact, 1 = pretty, 2 = json.
///
/// Return values: 0 for success, -1 for an unknown format.
#[export_name = "boundary_setup"]
pub extern "C" fn setup(log_format: u32) -> i32 {
    let Some(format) = LogFormat::from_repr(log_format) else {
        eprintln!("(RUST) Unknown log format {log_format}.");
        return SetupResult::UnknownLogFormat as i32;
    };
    if ALREADY_SETUP.swap(true, Ordering::SeqCst) {
        tracing::debug!("Logging already set up.");
        return SetupResult::Ok as i32;
    }
    init_logging(format);
    SetupResult::Ok as i32
}

/// [`setup`] with the format from the configuration file.
#[export_name = "boundary_setup_default"]
pub extern "C" fn setup_default() -> i32 {
    setup(config().logging.format as u32)
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config().logging.filter))
        .unwrap_or_else(|e| {
            eprintln!("(RUST) Bad log filter: {e}; falling back to \"info\".");
            EnvFilter::new("info")
        });

    // Blocking stderr so the line explaining an abort is not lost.
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Compact => registry
            .with(fmt::layer().with_writer(std::io::stderr).compact())
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).pretty())
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .try_init(),
    };
    if let Err(e) = installed {
        // The host process (or a test harness) got there first.
        eprintln!("(RUST) Could not install logger: {e}");
    }
}

fn all_live_handles() -> Vec<LiveHandle> {
    let mut live = RUST_STRINGS.live_handles();
    live.extend(TEST_STRUCTS.live_handles());
    live.extend(TEST_STRUCTS_2.live_handles());
    live
}

/// Number of handles currently live, across all handle types.
#[export_name = "boundary_live_handle_count"]
pub extern "C" fn live_handle_count() -> i64 {
    (RUST_STRINGS.live_count() + TEST_STRUCTS.live_count() + TEST_STRUCTS_2.live_count()) as i64
}

/// Report leaks. This function should be called before the host exits
/// (or unloads the library). Every handle still live is logged with
/// its age; nothing is freed, since the host may still hold them.
///
/// Return values: the number of live handles (0 means no leaks).
#[export_name = "boundary_shutdown"]
pub extern "C" fn shutdown() -> i64 {
    let now = Utc::now();
    let live = all_live_handles();
    for leaked in &live {
        let age = now.signed_duration_since(leaked.created_at);
        tracing::warn!(
            kind = %leaked.kind,
            handle = leaked.handle.0,
            age_ms = age.num_milliseconds(),
            "handle was never released"
        );
    }
    if live.is_empty() {
        tracing::info!("Boundary shut down cleanly.");
    } else {
        tracing::warn!(count = live.len(), "Boundary shut down with live handles.");
    }
    live.len() as i64
}
