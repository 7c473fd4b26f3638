#![deny(missing_docs)]
//! Shared logging utilities for the monitor workspace.
//!
//! This crate provides the `monitor_*` logging macros used across the codebase,
//! a per-thread polling cycle counter and a minimal test initializer for the
//! global logger.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the current polling cycle number.
    static CYCLE: Cell<u64> = const { Cell::new(0) };
}

/// Sets the polling cycle number for the current thread.
/// This should be called by the polling loop once per cycle.
pub fn set_cycle(cycle: u64) {
    CYCLE.with(|v| v.set(cycle));
}

/// Retrieves the polling cycle number for the current thread.
/// Returns 0 if no cycle has started yet.
pub fn current_cycle() -> u64 {
    CYCLE.with(|v| v.get())
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! monitor_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! monitor_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! monitor_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! monitor_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
