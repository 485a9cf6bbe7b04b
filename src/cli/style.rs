//! Terminal styling helpers for CLI output

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;

/// Check mark for completed steps
pub const CHECK: &str = "✓";

/// Arrow for plan steps
pub const ARROW: &str = "→";

/// Extension trait for the handful of styles grove uses.
pub trait Stylize {
    /// De-emphasized gray text
    fn muted(&self) -> String;
    /// Bold text
    fn emphasis(&self) -> String;
    /// Cyan accent for branch names and counts
    fn accent(&self) -> String;
    /// Green success text
    fn success(&self) -> String;
    /// Yellow warning text
    fn warn(&self) -> String;
    /// Red failure text
    fn failure(&self) -> String;
}

impl<T: std::fmt::Display> Stylize for T {
    fn muted(&self) -> String {
        format!("{}", self.dimmed())
    }

    fn emphasis(&self) -> String {
        format!("{}", self.bold())
    }

    fn accent(&self) -> String {
        format!("{}", self.cyan())
    }

    fn success(&self) -> String {
        format!("{}", self.green())
    }

    fn warn(&self) -> String {
        format!("{}", self.yellow())
    }

    fn failure(&self) -> String {
        format!("{}", self.red())
    }
}

/// Styled check mark
pub fn check() -> String {
    CHECK.success()
}

/// Styled arrow
pub fn arrow() -> String {
    ARROW.muted()
}

/// Spinner style for long-running steps
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}
