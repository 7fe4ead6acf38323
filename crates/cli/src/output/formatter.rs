//! Output formatter for human-readable and JSON output

use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;
use skiff_core::terminal;

use super::OutputConfig;

/// Formatter for CLI output
///
/// When JSON mode is enabled, all output is strict JSON without colors.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    /// Check if colors are enabled
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    fn paint(&self, text: &str, color: fn(&str) -> String) -> String {
        if self.colors_enabled() {
            color(text)
        } else {
            text.to_string()
        }
    }

    /// Output a success message; JSON mode reports success through the exit code
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        println!("{} {message}", self.paint("✓", terminal::green));
    }

    /// Output an error message
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({ "error": message });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else {
            eprintln!("{} {message}", self.paint("✗", terminal::red));
        }
    }

    /// Output a pre-built JSON structure
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }

    /// Highlight a key, path or identifier
    pub fn emphasis(&self, text: &str) -> String {
        self.paint(text, terminal::cyan)
    }

    /// Secondary detail such as sizes and timestamps
    pub fn muted(&self, text: &str) -> String {
        self.paint(text, terminal::gray)
    }

    /// Table with the CLI's shared look
    pub fn table(&self, header: &[&str]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_BORDERS_ONLY)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header.to_vec());
        if !self.colors_enabled() {
            table.force_no_tty();
        }
        table
    }
}
