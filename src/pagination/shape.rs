//! Classification of decoded page bodies.

use std::fmt;

use serde_json::Value;

/// Shape of a decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum PageShape {
    /// Object with a `results` array and optional `next` / `total`.
    Enveloped {
        results: Vec<Value>,
        next: Option<String>,
        total: Option<u64>,
    },
    /// Bare JSON array.
    RawList(Vec<Value>),
    /// Anything else; returned as a single item.
    Unrecognized(Value),
}

impl PageShape {
    /// Decide the shape of `body`.
    ///
    /// An object is enveloped as soon as it has a `results` key. A `results`
    /// value that is not an array counts as an empty page, and an empty or
    /// null `next` means there is no cursor link.
    pub fn classify(body: Value) -> Self {
        match body {
            Value::Object(mut map) if map.contains_key("results") => {
                let results = match map.remove("results") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                let next = map
                    .get("next")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                let total = map.get("total").and_then(Value::as_u64);
                PageShape::Enveloped {
                    results,
                    next,
                    total,
                }
            }
            Value::Array(items) => PageShape::RawList(items),
            other => PageShape::Unrecognized(other),
        }
    }

    /// Mode a fetch enters when this is the first page.
    pub fn mode(&self) -> PaginationMode {
        match self {
            PageShape::Enveloped { .. } => PaginationMode::Enveloped,
            PageShape::RawList(_) => PaginationMode::RawList,
            PageShape::Unrecognized(_) => PaginationMode::Single,
        }
    }
}

/// Pagination strategy chosen from the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaginationMode {
    /// `results` envelope with `next` links or a `total` count.
    Enveloped,
    /// Bare arrays paged with `page=` until a short page.
    RawList,
    /// Unpaginated single value.
    Single,
}

impl fmt::Display for PaginationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationMode::Enveloped => write!(f, "enveloped"),
            PaginationMode::RawList => write!(f, "raw-list"),
            PaginationMode::Single => write!(f, "single"),
        }
    }
}
