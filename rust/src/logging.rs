//! Logging macros for the planners with verbosity level control.
//!
//! Provides zero-cost logging when disabled (verbosity=0).
//! Verbosity levels:
//! - 0: SILENT
//! - 1: SUMMARY (one line per run: length, labels, termination)
//! - 2: PHASES (construction and merge statistics)
//! - 3: DEBUG (per-node label counts)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_SUMMARY: u8 = 1;
pub const VERBOSITY_PHASES: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at SUMMARY level (verbosity >= 1).
#[macro_export]
macro_rules! log_summary {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_SUMMARY {
            eprintln!($($arg)*);
        }
    };
}

/// Log at PHASES level (verbosity >= 2).
///
/// Used for: reachability pruning, split choice, merge results.
#[macro_export]
macro_rules! log_phases {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_PHASES {
            eprintln!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels_are_ordered() {
        assert!(VERBOSITY_SILENT < VERBOSITY_SUMMARY);
        assert!(VERBOSITY_SUMMARY < VERBOSITY_PHASES);
        assert!(VERBOSITY_PHASES < VERBOSITY_DEBUG);
    }

    #[test]
    fn test_log_macros_compile() {
        let verbosity = VERBOSITY_SILENT;
        log_summary!(verbosity, "test {}", 1);
        log_phases!(verbosity, "test {}", 2);
        log_debug!(verbosity, "test {}", 3);
    }
}
