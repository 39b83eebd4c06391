//! Stderr diagnostics for solves and renders, gated by `-v` count.
//!
//! The macros test the verbosity before formatting anything, so a silent
//! solve pays only an integer comparison per call site. Stdout stays free for
//! the `Saved:` line and the `report` table.
//!
//! | level | emits |
//! |-------|-------|
//! | 0 | nothing; errors surface through `Result` |
//! | 1 | activity and link counts, project duration, rendered format |
//! | 2 | ES/EF and LS/LF per activity as each pass visits it |
//! | 3 | topological order and effective float tolerance |

/// `-v` count at or above which each macro prints.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_SUMMARY: u8 = 1;
pub const VERBOSITY_PASSES: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// One line per pipeline stage: parse, solve, render.
#[macro_export]
macro_rules! log_summary {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_SUMMARY {
            eprintln!($($arg)*);
        }
    };
}

/// Per-activity forward and backward pass values.
#[macro_export]
macro_rules! log_passes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_PASSES {
            eprintln!($($arg)*);
        }
    };
}

/// Solver internals.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!($($arg)*);
        }
    };
}
