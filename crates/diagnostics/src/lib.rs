// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Structured logging shared by the sparkify crates.
//!
//! Logs go to stderr through `emit_term`. The level comes from the
//! `SPARKIFY_LOG` environment variable:
//! - `off` (default): nothing is emitted
//! - `error`, `warn`, `info`, `debug`: minimum level to emit

use std::sync::Once;

// Re-export emit so the macros below resolve from any crate.
pub use emit;

/// Environment variable that selects the log level.
pub const LOG_ENV: &str = "SPARKIFY_LOG";

static INIT: Once = Once::new();

/// Parse a `SPARKIFY_LOG` value. `None` means logging is off.
///
/// Unknown values fall back to `Info`.
#[must_use]
pub fn parse_level(value: &str) -> Option<emit::Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" | "" => None,
        "error" => Some(emit::Level::Error),
        "warn" => Some(emit::Level::Warn),
        "debug" => Some(emit::Level::Debug),
        _ => Some(emit::Level::Info),
    }
}

/// Install the process-wide emitter. Later calls are no-ops.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
        let Some(level) = parse_level(&value) else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The emitter lives for the rest of the process.
        std::mem::forget(rt);
    });
}

/// Pipeline progress a user running the job wants to see.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Per-stage detail: discovered files, resolved locations, row counts.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Conditions that don't stop the run.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Failures that end the run.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;
