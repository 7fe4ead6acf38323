//! Terminal and CI detection with conditional styling
//!
//! Decoration (colors, progress bars) is only emitted when stdout is a
//! terminal and the process is not running under continuous integration.
//! The process-wide [`ColorMode`] can force styling on or off.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicU8, Ordering};

use console::{StyledObject, style};

/// Environment variable set by CI providers
pub const CI_ENV: &str = "CI";

/// Whether the `CI` flag marks this run as continuous integration
pub fn is_ci() -> bool {
    ci_flag_set(std::env::var(CI_ENV).ok().as_deref())
}

fn ci_flag_set(value: Option<&str>) -> bool {
    !matches!(value, None | Some("") | Some("false"))
}

/// Whether stdout may carry styling and progress output
pub fn is_decorated() -> bool {
    console::Term::stdout().is_term() && !is_ci()
}

/// When styling is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ColorMode {
    /// Style only a decorated stdout
    #[default]
    Auto = 0,
    Always = 1,
    Never = 2,
}

impl ColorMode {
    /// Mode for a defaults-file value; unknown values mean auto
    pub fn from_name(name: &str) -> Self {
        match name {
            "always" => ColorMode::Always,
            "never" => ColorMode::Never,
            _ => ColorMode::Auto,
        }
    }

    fn styles(self) -> bool {
        match self {
            ColorMode::Auto => is_decorated(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

static COLOR_MODE: AtomicU8 = AtomicU8::new(ColorMode::Auto as u8);

/// Set the color mode for the rest of the process
pub fn set_color_mode(mode: ColorMode) {
    COLOR_MODE.store(mode as u8, Ordering::Relaxed);
}

pub fn color_mode() -> ColorMode {
    match COLOR_MODE.load(Ordering::Relaxed) {
        1 => ColorMode::Always,
        2 => ColorMode::Never,
        _ => ColorMode::Auto,
    }
}

/// Whether stdin is attached to an interactive terminal
pub fn stdin_is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

fn render<D: std::fmt::Display>(styled: StyledObject<D>) -> String {
    styled.force_styling(color_mode().styles()).to_string()
}

pub fn bold(input: &str) -> String {
    render(style(input).bold())
}

pub fn dim(input: &str) -> String {
    render(style(input).dim())
}

pub fn italic(input: &str) -> String {
    render(style(input).italic())
}

pub fn underline(input: &str) -> String {
    render(style(input).underlined())
}

/// Rarely supported across terminals
pub fn strikethrough(input: &str) -> String {
    render(style(input).strikethrough())
}

pub fn red(input: &str) -> String {
    render(style(input).red().bright())
}

pub fn green(input: &str) -> String {
    render(style(input).green())
}

pub fn yellow(input: &str) -> String {
    render(style(input).yellow())
}

pub fn blue(input: &str) -> String {
    render(style(input).blue())
}

pub fn magenta(input: &str) -> String {
    render(style(input).magenta())
}

pub fn cyan(input: &str) -> String {
    render(style(input).cyan())
}

pub fn gray(input: &str) -> String {
    render(style(input).white())
}
