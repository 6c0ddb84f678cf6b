//! Output abstraction for quiet mode support.
//!
//! This module provides a centralized way to control CLI output based on
//! quiet mode settings. It distinguishes between:
//! - Data output (rendered results, never suppressed)
//! - Notices and warnings (stderr, suppressed in quiet mode)

/// Receives side-channel messages produced while an invocation runs.
pub trait Reporter {
    /// Progress notice, such as a pending retry.
    fn notice(&self, msg: &str);

    /// Non-fatal problem the user should know about.
    fn warn(&self, msg: &str);
}

/// Output handler that respects quiet mode.
///
/// Quiet mode is enabled if either `--quiet` is passed or `--json-errors` is used.
/// In quiet mode, only requested data and errors are output.
#[derive(Debug, Clone)]
pub struct Output {
    quiet: bool,
}

impl Output {
    /// Create new Output handler.
    ///
    /// Quiet mode is enabled if `--quiet` is passed OR `--json-errors` is passed.
    #[must_use]
    pub const fn new(quiet: bool, json_errors: bool) -> Self {
        Self {
            quiet: quiet || json_errors,
        }
    }

    /// Print requested data (never suppressed).
    pub fn data(&self, msg: impl std::fmt::Display) {
        println!("{msg}");
    }

    /// Check if quiet mode is enabled.
    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl Reporter for Output {
    fn notice(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{msg}");
        }
    }

    fn warn(&self, msg: &str) {
        if !self.quiet {
            eprintln!("Warning: {msg}");
        }
    }
}
