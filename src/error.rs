//! Error types for Mist API operations.

use thiserror::Error;

/// Errors that can occur when talking to the Mist API or transforming its data.
#[derive(Debug, Error)]
pub enum MistError {
    /// Environment key is not one of the known Mist clouds.
    #[error("invalid environment `{0}`, choose from: {1}")]
    InvalidEnvironment(String, String),

    /// No stored credentials for the environment.
    #[error("no valid credentials found for environment: {0}")]
    CredentialsNotFound(String),

    /// An API token must not be blank.
    #[error("api token cannot be empty")]
    EmptyToken,

    /// The home directory could not be determined.
    #[error("home directory not found")]
    NoHomeDir,

    /// Fetch configuration rejected before any request was made.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Non-success HTTP status, with the response body for diagnosis.
    #[error("http {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Network or subnet arguments could not be split.
    #[error("invalid network: {0}")]
    InvalidNetwork(String),

    /// JSON (de)serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// URL could not be parsed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// CSV read or write error.
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet could not be read.
    #[error("xlsx read: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    /// Spreadsheet could not be written.
    #[error("xlsx write: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl MistError {
    /// Create an HTTP status error.
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MistError>;
