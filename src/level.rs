// Log levels and the compile-time threshold

use serde::{Deserialize, Serialize};

/// Log severity levels (0-3, higher is more severe)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Verbose diagnostics (hot-path traces, state dumps)
    Debug = 0,
    /// Normal operation (startup, shutdown, progress)
    Info = 1,
    /// Something unexpected that the process can absorb
    Warn = 2,
    /// A failed operation
    Error = 3,
}

impl Level {
    /// Get level as u8 (0-3)
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get level name as static string
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// Create from u8 value (returns None if invalid)
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Level::Debug),
            1 => Some(Level::Info),
            2 => Some(Level::Warn),
            3 => Some(Level::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A level threshold: every `Level` plus `Off`, which disables all logging
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LevelFilter {
    /// Allow everything
    Debug = 0,
    /// Allow Info and above
    Info = 1,
    /// Allow Warn and above
    Warn = 2,
    /// Allow Error only
    Error = 3,
    /// Allow nothing
    Off = 4,
}

impl LevelFilter {
    /// Get filter name as static string
    pub const fn as_str(self) -> &'static str {
        match self {
            LevelFilter::Debug => "DEBUG",
            LevelFilter::Info => "INFO",
            LevelFilter::Warn => "WARN",
            LevelFilter::Error => "ERROR",
            LevelFilter::Off => "OFF",
        }
    }

    /// Whether a record at `level` passes this threshold
    #[inline]
    pub const fn allows(self, level: Level) -> bool {
        level.as_u8() >= self as u8
    }
}

impl std::fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The build-time threshold selected via the `static-level-*` cargo features.
///
/// The logging macros guard each call site with [`statically_enabled`], so
/// levels below this threshold constant-fold to nothing: no record is built,
/// no ring slot is consumed, no wake is issued.
pub const STATIC_LEVEL: LevelFilter = static_level();

const fn static_level() -> LevelFilter {
    if cfg!(feature = "static-level-off") {
        LevelFilter::Off
    } else if cfg!(feature = "static-level-error") {
        LevelFilter::Error
    } else if cfg!(feature = "static-level-warn") {
        LevelFilter::Warn
    } else if cfg!(feature = "static-level-info") {
        LevelFilter::Info
    } else {
        LevelFilter::Debug
    }
}

/// Whether a call site at `level` survives the build-time threshold
#[inline(always)]
pub const fn statically_enabled(level: Level) -> bool {
    STATIC_LEVEL.allows(level)
}
