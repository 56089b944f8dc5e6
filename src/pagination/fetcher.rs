//! The paginated fetch loop.

use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::progress::{BarProgress, FetchSummary, NoProgress, Progress};
use super::shape::PageShape;
use super::url::{origin, page_of, page_size_of, resolve_next, with_page, with_page_size};
use crate::config::FetchConfig;
use crate::error::{MistError, Result};

/// Total item count across all pages.
pub const X_PAGE_TOTAL: &str = "X-Page-Total";

/// Page number of the response.
pub const X_PAGE_PAGE: &str = "X-Page-Page";

/// Page size the server applied.
pub const X_PAGE_LIMIT: &str = "X-Page-Limit";

/// One decoded response.
struct Page {
    headers: HeaderMap,
    body: Value,
}

/// Read an integer side-channel header. Missing or malformed values yield `None`.
fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

async fn get_page(client: &Client, url: &str, headers: &HeaderMap, verbose: bool) -> Result<Page> {
    debug!(%url, "GET");
    let response = client.get(url).headers(headers.clone()).send().await?;

    let status = response.status();
    let resp_headers = response.headers().clone();
    if verbose {
        info!(
            %url,
            status = status.as_u16(),
            total = ?header_u64(&resp_headers, X_PAGE_TOTAL),
            page = ?header_u64(&resp_headers, X_PAGE_PAGE),
            limit = ?header_u64(&resp_headers, X_PAGE_LIMIT),
            "page response"
        );
    }

    let text = response.text().await?;
    if !status.is_success() {
        return Err(MistError::http_status(status.as_u16(), text));
    }

    Ok(Page {
        headers: resp_headers,
        body: serde_json::from_str(&text)?,
    })
}

fn is_cancelled(cancel: Option<&CancellationToken>) -> bool {
    cancel.is_some_and(CancellationToken::is_cancelled)
}

fn reached(total: Option<u64>, fetched: usize) -> bool {
    total.is_some_and(|total| fetched as u64 >= total)
}

/// Fetch every page starting at `url`, with the progress display chosen by
/// `config.show_progress`.
///
/// # Errors
///
/// Fails only when the configuration is invalid or the first request fails.
/// Failures on later pages end the fetch and return what was gathered.
pub async fn fetch_all(
    client: &Client,
    url: &str,
    headers: &HeaderMap,
    config: &FetchConfig,
) -> Result<Vec<Value>> {
    if config.show_progress {
        let mut progress = BarProgress::new();
        fetch_all_with(client, url, headers, config, &mut progress, None).await
    } else {
        fetch_all_with(client, url, headers, config, &mut NoProgress, None).await
    }
}

/// Fetch every page starting at `url`, reporting to `progress`.
///
/// The first response decides the pagination mode for the whole fetch.
/// `cancel` is checked once per page; cancelling ends the fetch with the
/// items gathered so far.
pub async fn fetch_all_with(
    client: &Client,
    url: &str,
    headers: &HeaderMap,
    config: &FetchConfig,
    progress: &mut dyn Progress,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<Value>> {
    config.validate()?;

    let start_url = with_page_size(url, config.page_size);
    let origin = origin(&start_url)?;

    let first = get_page(client, &start_url, headers, config.debug).await?;
    let header_total = header_u64(&first.headers, X_PAGE_TOTAL);

    let mut fetch = Fetch {
        client,
        headers,
        config,
        progress,
        cancel,
        items: Vec::new(),
        pages: 1,
        total: header_total,
        url: start_url,
    };

    let shape = PageShape::classify(first.body);
    let mode = shape.mode();
    match shape {
        PageShape::Enveloped {
            results,
            next,
            total,
        } => fetch.enveloped(&origin, results, next, total).await,
        PageShape::RawList(items) => fetch.raw_list(&first.headers, items).await,
        PageShape::Unrecognized(value) => {
            fetch.items.push(value);
            fetch.progress.on_items(1, fetch.total);
        }
    }

    let summary = FetchSummary {
        mode,
        items: fetch.items.len(),
        pages: fetch.pages,
    };
    info!(mode = %summary.mode, pages = summary.pages, items = summary.items, "fetch complete");
    fetch.progress.on_finish(&summary);
    Ok(fetch.items)
}

/// State of one `fetch_all_with` call.
struct Fetch<'a> {
    client: &'a Client,
    headers: &'a HeaderMap,
    config: &'a FetchConfig,
    progress: &'a mut dyn Progress,
    cancel: Option<&'a CancellationToken>,
    items: Vec<Value>,
    pages: usize,
    total: Option<u64>,
    url: String,
}

impl Fetch<'_> {
    fn extend(&mut self, batch: Vec<Value>) {
        self.items.extend(batch);
        self.progress.on_items(self.items.len(), self.total);
    }

    /// Fetch a follow-up page. Errors are logged and turned into `None`.
    async fn follow(&mut self, url: &str) -> Option<Page> {
        match get_page(self.client, url, self.headers, self.config.debug).await {
            Ok(page) => {
                self.pages += 1;
                self.url = url.to_string();
                Some(page)
            }
            Err(e) => {
                warn!(%url, error = %e, gathered = self.items.len(), "stopping pagination");
                None
            }
        }
    }

    async fn enveloped(
        &mut self,
        origin: &str,
        results: Vec<Value>,
        mut next: Option<String>,
        body_total: Option<u64>,
    ) {
        if body_total.is_some() {
            self.total = body_total;
        }
        if results.is_empty() {
            self.progress.on_items(0, self.total);
            return;
        }
        self.extend(results);

        loop {
            if is_cancelled(self.cancel) || reached(self.total, self.items.len()) {
                break;
            }

            // A cursor link always wins over page arithmetic.
            let target = match next.take() {
                Some(link) => resolve_next(origin, &link),
                None if self.total.is_some() => {
                    let page = page_of(&self.url).unwrap_or(1);
                    with_page(&self.url, page + 1)
                }
                None => break,
            };

            tokio::time::sleep(self.config.page_delay).await;
            let Some(page) = self.follow(&target).await else {
                break;
            };

            match PageShape::classify(page.body) {
                PageShape::Enveloped {
                    results,
                    next: page_next,
                    total,
                } => {
                    if results.is_empty() {
                        break;
                    }
                    if total.is_some() {
                        self.total = total;
                    }
                    next = page_next;
                    self.extend(results);
                }
                _ => {
                    debug!(url = %target, "page without results, treating as end of data");
                    break;
                }
            }
        }
    }

    async fn raw_list(&mut self, first_headers: &HeaderMap, items: Vec<Value>) {
        // The URL's limit is the caller's own choice when one was given.
        let limit = header_u64(first_headers, X_PAGE_LIMIT)
            .or_else(|| page_size_of(&self.url))
            .unwrap_or_else(|| u64::from(self.config.page_size));
        let mut page = header_u64(first_headers, X_PAGE_PAGE)
            .or_else(|| page_of(&self.url))
            .unwrap_or(1);
        let mut last_len = items.len() as u64;
        self.extend(items);

        // A full page means more may follow.
        while limit > 0 && last_len == limit {
            if is_cancelled(self.cancel) || reached(self.total, self.items.len()) {
                break;
            }

            page += 1;
            let target = with_page(&self.url, page);
            let Some(next) = self.follow(&target).await else {
                break;
            };

            if let Some(server_page) = header_u64(&next.headers, X_PAGE_PAGE) {
                page = server_page;
            }
            if let Some(total) = header_u64(&next.headers, X_PAGE_TOTAL) {
                self.total = Some(total);
            }

            match PageShape::classify(next.body) {
                PageShape::RawList(batch) => {
                    last_len = batch.len() as u64;
                    self.extend(batch);
                }
                _ => {
                    debug!(url = %target, "page is not a list, treating as end of data");
                    break;
                }
            }
        }
    }
}
