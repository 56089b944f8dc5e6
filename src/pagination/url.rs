//! Query-string manipulation for page requests.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;

/// Query parameter carrying the requested page size.
pub const PAGE_SIZE_PARAM: &str = "limit";

/// Query parameter carrying the page number.
pub const PAGE_PARAM: &str = "page";

static PAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([?&])page=(\d*)").unwrap());

static PAGE_SIZE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&]limit=").unwrap());

fn append_param(url: &str, key: &str, value: impl std::fmt::Display) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{key}={value}")
}

/// Add the page size parameter unless the caller already chose one.
pub fn with_page_size(url: &str, page_size: u32) -> String {
    if PAGE_SIZE_REGEX.is_match(url) {
        url.to_string()
    } else {
        append_param(url, PAGE_SIZE_PARAM, page_size)
    }
}

/// Set the page parameter, replacing an existing `page=` in place.
pub fn with_page(url: &str, page: u64) -> String {
    if PAGE_REGEX.is_match(url) {
        PAGE_REGEX
            .replace(url, format!("${{1}}{PAGE_PARAM}={page}"))
            .into_owned()
    } else {
        append_param(url, PAGE_PARAM, page)
    }
}

/// Page number present in the URL, if any.
pub fn page_of(url: &str) -> Option<u64> {
    PAGE_REGEX
        .captures(url)
        .and_then(|caps| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

/// Page size present in the URL, if any.
pub fn page_size_of(url: &str) -> Option<u64> {
    url::Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == PAGE_SIZE_PARAM)
        .and_then(|(_, value)| value.parse().ok())
}

/// Scheme, host and (non-default) port of a URL, without a trailing slash.
pub fn origin(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)?;
    Ok(parsed.origin().ascii_serialization())
}

/// Resolve a `next` link against the origin of the first request.
///
/// Links starting with `/` are host-relative; anything else is used as-is.
pub fn resolve_next(origin: &str, next: &str) -> String {
    if next.starts_with('/') {
        format!("{origin}{next}")
    } else {
        next.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_appended() {
        assert_eq!(
            with_page_size("https://h/api/v1/sites", 100),
            "https://h/api/v1/sites?limit=100"
        );
        assert_eq!(
            with_page_size("https://h/api/v1/sites?type=ap", 50),
            "https://h/api/v1/sites?type=ap&limit=50"
        );
    }

    #[test]
    fn test_page_size_caller_wins() {
        let url = "https://h/api/v1/sites?limit=7";
        assert_eq!(with_page_size(url, 100), url);
        let url = "https://h/api/v1/sites?type=ap&limit=7";
        assert_eq!(with_page_size(url, 100), url);
    }

    #[test]
    fn test_page_size_ignores_similar_names() {
        assert_eq!(
            with_page_size("https://h/x?ratelimit=3", 10),
            "https://h/x?ratelimit=3&limit=10"
        );
    }

    #[test]
    fn test_page_inserted() {
        assert_eq!(with_page("https://h/x", 2), "https://h/x?page=2");
        assert_eq!(with_page("https://h/x?limit=5", 2), "https://h/x?limit=5&page=2");
    }

    #[test]
    fn test_page_replaced_not_duplicated() {
        assert_eq!(
            with_page("https://h/x?page=2&limit=5", 3),
            "https://h/x?page=3&limit=5"
        );
        assert_eq!(
            with_page("https://h/x?limit=5&page=9", 10),
            "https://h/x?limit=5&page=10"
        );
        assert_eq!(with_page("https://h/x?limit=5&page=", 4), "https://h/x?limit=5&page=4");
    }

    #[test]
    fn test_page_of() {
        assert_eq!(page_of("https://h/x?limit=5&page=3"), Some(3));
        assert_eq!(page_of("https://h/x?page=12"), Some(12));
        assert_eq!(page_of("https://h/x?limit=5"), None);
        assert_eq!(page_of("https://h/x?subpage=4"), None);
    }

    #[test]
    fn test_page_size_of() {
        assert_eq!(page_size_of("https://h/x?limit=7&page=2"), Some(7));
        assert_eq!(page_size_of("https://h/x?page=2"), None);
        assert_eq!(page_size_of("https://h/x?limit=many"), None);
    }

    #[test]
    fn test_origin() {
        assert_eq!(origin("https://h/a?x=1").unwrap(), "https://h");
        assert_eq!(
            origin("http://127.0.0.1:8080/api/v1/x").unwrap(),
            "http://127.0.0.1:8080"
        );
        assert!(origin("not a url").is_err());
    }

    #[test]
    fn test_resolve_next() {
        assert_eq!(resolve_next("https://h", "/b?x=2"), "https://h/b?x=2");
        assert_eq!(
            resolve_next("https://h", "https://other/b?x=2"),
            "https://other/b?x=2"
        );
    }
}
