//! Output formatting utilities
//!
//! Human-readable and JSON output for CLI commands.

mod formatter;

use skiff_core::terminal::ColorMode;

pub use formatter::Formatter;

/// Output configuration derived from CLI flags and the defaults file
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Style output even when stdout is not a terminal
    pub force_color: bool,
    /// Suppress non-error output
    pub quiet: bool,
}

impl OutputConfig {
    /// Process-wide styling mode for this output
    pub fn color_mode(&self) -> ColorMode {
        if self.no_color || self.json {
            ColorMode::Never
        } else if self.force_color {
            ColorMode::Always
        } else {
            ColorMode::Auto
        }
    }
}
