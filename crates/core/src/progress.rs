//! Progress bar utilities for transfer operations
//!
//! Transfers report bytes through [`TransferProgress`]; the bar is only drawn
//! on an interactive, non-CI terminal.

use crate::terminal;

/// Sink for transferred byte counts
pub trait TransferProgress: Send + Sync {
    /// Record `bytes` more bytes transferred
    fn advance(&self, bytes: u64);
}

/// Byte-scaled progress bar wrapper
#[derive(Debug)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Progress bar for a transfer of `total` bytes, shown only on a decorated terminal
    pub fn for_transfer(total: u64) -> Self {
        if terminal::is_decorated() {
            Self::visible(total)
        } else {
            Self::hidden()
        }
    }

    /// A progress bar that never draws
    pub fn hidden() -> Self {
        Self { bar: None }
    }

    fn visible(total: u64) -> Self {
        let bar = indicatif::ProgressBar::new(total);
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({binary_bytes_per_sec}, {eta})")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar: Some(bar) }
    }

    /// Finish and clear the progress bar
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    /// Check if progress bar is visible
    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

impl TransferProgress for ProgressBar {
    fn advance(&self, bytes: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(bytes);
        }
    }
}
