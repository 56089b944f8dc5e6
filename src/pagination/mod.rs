//! Paginated list retrieval.
//!
//! Mist endpoints paginate in two incompatible ways:
//!
//! - **Enveloped**: `{"results": [...], "next": "/api/v1/...", "total": N}`. The
//!   `next` link is followed when present; otherwise a known `total` drives
//!   `page=` increments.
//! - **Raw list**: a bare JSON array with `X-Page-Total`, `X-Page-Page` and
//!   `X-Page-Limit` headers. A full page means another may follow.
//!
//! The first response fixes the mode for the whole fetch. A failure on the
//! first request is an error; a failure on any later page ends the fetch and
//! returns what was gathered.

mod fetcher;
mod progress;
mod shape;
pub mod url;

pub use fetcher::{fetch_all, fetch_all_with, X_PAGE_LIMIT, X_PAGE_PAGE, X_PAGE_TOTAL};
pub use progress::{BarProgress, FetchSummary, LogProgress, NoProgress, Progress};
pub use shape::{PageShape, PaginationMode};
