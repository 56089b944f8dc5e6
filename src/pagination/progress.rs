//! Progress observers for paginated fetches.
//!
//! Reporting is a side effect only; observers never influence when a fetch stops.

use std::sync::LazyLock;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::shape::PaginationMode;

/// Outcome of a finished fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub mode: PaginationMode,
    pub items: usize,
    pub pages: usize,
}

/// Receives progress events from `fetch_all_with`.
pub trait Progress: Send {
    /// Items gathered so far, and the best-known total if any.
    fn on_items(&mut self, fetched: usize, total: Option<u64>);

    fn on_finish(&mut self, summary: &FetchSummary);
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn on_items(&mut self, _fetched: usize, _total: Option<u64>) {}

    fn on_finish(&mut self, _summary: &FetchSummary) {}
}

/// Reports through `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn on_items(&mut self, fetched: usize, total: Option<u64>) {
        match total {
            Some(total) => info!("Retrieved {fetched} of {total} items"),
            None => info!("Retrieved {fetched} items"),
        }
    }

    fn on_finish(&mut self, summary: &FetchSummary) {
        info!(
            mode = %summary.mode,
            pages = summary.pages,
            "Fetched {} items",
            summary.items
        );
    }
}

const BAR_TEMPLATE: &str = "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} items {msg}";

const SPINNER_TEMPLATE: &str = "{spinner:.blue} [{elapsed_precise}] {pos} items {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const BAR_CHARS: &str = "█▓▒░  ";

static BAR_STYLE: LazyLock<Option<ProgressStyle>> = LazyLock::new(|| {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .ok()
        .map(|style| style.tick_chars(TICK).progress_chars(BAR_CHARS))
});

static SPINNER_STYLE: LazyLock<Option<ProgressStyle>> = LazyLock::new(|| {
    ProgressStyle::with_template(SPINNER_TEMPLATE)
        .ok()
        .map(|style| style.tick_chars(TICK))
});

/// Terminal progress bar.
///
/// Starts as a spinner and switches to a bar once a total is known.
pub struct BarProgress {
    pb: ProgressBar,
    has_length: bool,
}

impl BarProgress {
    pub fn new() -> Self {
        let pb = ProgressBar::no_length();
        if let Some(style) = SPINNER_STYLE.as_ref() {
            pb.set_style(style.clone());
        }
        Self {
            pb,
            has_length: false,
        }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for BarProgress {
    fn on_items(&mut self, fetched: usize, total: Option<u64>) {
        if let Some(total) = total {
            if !self.has_length {
                if let Some(style) = BAR_STYLE.as_ref() {
                    self.pb.set_style(style.clone());
                }
                self.has_length = true;
            }
            self.pb.set_length(total.max(fetched as u64));
        }
        self.pb.set_position(fetched as u64);
    }

    fn on_finish(&mut self, summary: &FetchSummary) {
        self.pb.finish_with_message(format!(
            "{} items in {} pages ({})",
            summary.items, summary.pages, summary.mode
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_compile() {
        assert!(BAR_STYLE.is_some());
        assert!(SPINNER_STYLE.is_some());
    }

    #[test]
    fn test_bar_tracks_total() {
        let mut progress = BarProgress::new();
        progress.on_items(2, None);
        assert_eq!(progress.pb.position(), 2);
        assert_eq!(progress.pb.length(), None);

        progress.on_items(4, Some(10));
        assert_eq!(progress.pb.position(), 4);
        assert_eq!(progress.pb.length(), Some(10));

        // An undercounted total never makes the bar overflow.
        progress.on_items(12, Some(10));
        assert_eq!(progress.pb.length(), Some(12));
    }
}
