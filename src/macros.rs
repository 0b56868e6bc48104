// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logging macros for convenient submission
//
// Each macro folds the build-time threshold into the call site: a level
// excluded by the `static-level-*` features compiles to nothing - no
// record, no ring slot, no wake.

/// Submit a record at an explicit level
///
/// # Examples
/// ```ignore
/// log_event!(engine, Level::Info, "rule {} added on {}", rule_id, iface);
/// ```
#[macro_export]
macro_rules! log_event {
    ($engine:expr, $level:expr, $template:expr $(,)?) => {{
        let level = $level;
        if $crate::level::statically_enabled(level) {
            let _ = $engine.push(level, $template, ());
        }
    }};
    ($engine:expr, $level:expr, $template:expr, $($arg:expr),+ $(,)?) => {{
        let level = $level;
        if $crate::level::statically_enabled(level) {
            let _ = $engine.push(level, $template, ($($arg,)+));
        }
    }};
}

/// Log a message with debug level
///
/// # Examples
/// ```ignore
/// log_debug!(engine, "parsed {} entries in {}us", count, elapsed);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($engine:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::log_event!($engine, $crate::level::Level::Debug, $template $(, $arg)*)
    };
}

/// Log a message with info level
///
/// # Examples
/// ```ignore
/// log_info!(engine, "worker {} started", worker_id);
/// ```
#[macro_export]
macro_rules! log_info {
    ($engine:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::log_event!($engine, $crate::level::Level::Info, $template $(, $arg)*)
    };
}

/// Log a message with warn level
///
/// # Examples
/// ```ignore
/// log_warn!(engine, "queue at {}% capacity", pct);
/// ```
#[macro_export]
macro_rules! log_warn {
    ($engine:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::log_event!($engine, $crate::level::Level::Warn, $template $(, $arg)*)
    };
}

/// Log a message with error level
///
/// # Examples
/// ```ignore
/// log_error!(engine, "failed to bind {}: {}", addr, errno);
/// ```
#[macro_export]
macro_rules! log_error {
    ($engine:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::log_event!($engine, $crate::level::Level::Error, $template $(, $arg)*)
    };
}
