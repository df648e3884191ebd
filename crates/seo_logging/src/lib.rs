#![deny(missing_docs)]
//! Shared logging utilities for the SEO client workspace.
//!
//! Every crate logs through the `seo_*` macros so the developer console
//! (terminal or `seo.log`) is the single sink for diagnostics that are not
//! meant for the user-facing analysis log.

use std::cell::Cell;

thread_local! {
    /// Identifier of the analysis stream currently being handled on this thread.
    static STREAM_CONTEXT: Cell<u64> = const { Cell::new(0) };
}

/// Records which stream the current thread is working on.
///
/// The app loop sets this before dispatching a stream message so that
/// developer log lines can be correlated with a session.
pub fn set_stream_context(stream_id: u64) {
    STREAM_CONTEXT.with(|v| v.set(stream_id));
}

/// Returns the stream id recorded for this thread, or 0 when none is set.
pub fn stream_context() -> u64 {
    STREAM_CONTEXT.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! seo_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: "seo", "[s{}] {}", $crate::stream_context(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! seo_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: "seo", "[s{}] {}", $crate::stream_context(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! seo_info {
    ($($arg:tt)*) => {{
        log::info!(target: "seo", "[s{}] {}", $crate::stream_context(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! seo_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: "seo", "[s{}] {}", $crate::stream_context(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! seo_error {
    ($($arg:tt)*) => {{
        log::error!(target: "seo", "[s{}] {}", $crate::stream_context(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test in the same binary may have installed the logger already.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Never,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_context_is_per_thread() {
        set_stream_context(7);
        assert_eq!(stream_context(), 7);
        let other = std::thread::spawn(stream_context).join().unwrap();
        assert_eq!(other, 0);
    }

    #[test]
    fn macros_expand_without_logger() {
        seo_info!("hello {}", 1);
        seo_warn!("plain");
    }
}
