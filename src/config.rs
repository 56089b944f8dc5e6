//! Fetch configuration passed explicitly into paginated retrieval.

use std::time::Duration;

use crate::error::{MistError, Result};

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default pause between successive enveloped-mode page requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(100);

/// Options for a single `fetch_all` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub page_size: u32,
    pub show_progress: bool,
    pub debug: bool,
    pub page_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            show_progress: true,
            debug: false,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

impl FetchConfig {
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Reject settings that cannot produce a valid first request.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(MistError::InvalidConfig(
                "page_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
