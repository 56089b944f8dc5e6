//! Thin Rust client for the Juniper Mist cloud-management API.
//!
//! This crate stores per-environment API credentials, issues authenticated
//! requests, and retrieves complete result sets from paginated list endpoints.
//! Helpers convert those results to CSV, xlsx or tables, and split IPv4 networks
//! into subnets for site planning.
//!
//! # Features
//!
//! - Credentials for every Mist cloud, stored as JSON under `~/.mistrs`
//! - GET, POST, PUT and DELETE with `Token` authorization
//! - `get_all` over both pagination styles the API uses
//! - CSV and xlsx import/export and table printing
//!
//! # Example
//!
//! ```ignore
//! use mistrs::{CredentialStore, Environment, FetchConfig, MistClient, MistError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), MistError> {
//!     let creds = CredentialStore::default_location()?.load(Environment::Emea01)?;
//!     let client = MistClient::from_credentials(&creds)?;
//!
//!     // Single resource
//!     let me = client.self_info().await?;
//!
//!     // Every page of a list endpoint
//!     let config = FetchConfig::default().with_page_size(500);
//!     let sites = client.get_all("orgs/<org_id>/sites", &config).await?;
//!
//!     mistrs::data::write_csv(&sites, "sites.csv")?;
//!     Ok(())
//! }
//! ```
//!
//! # Pagination
//!
//! | First response | Continuation | Stops when |
//! |----------------|--------------|------------|
//! | `{"results": [...]}` | `next` link, else `page=` up to `total` | total reached, empty page, no link or total |
//! | `[...]` | `page=` while pages are full | short page, total reached |
//! | anything else | none | immediately |
//!
//! Failures after the first page end the fetch and return the items gathered so far.

mod client;
mod config;
mod credentials;
mod environment;
mod error;

pub mod data;
pub mod pagination;
pub mod subnet;

pub use client::{ApiResponse, MistClient, DEFAULT_TIMEOUT};
pub use config::{FetchConfig, DEFAULT_PAGE_DELAY, DEFAULT_PAGE_SIZE};
pub use credentials::{auth_headers, CredentialStore, Credentials};
pub use environment::Environment;
pub use error::{MistError, Result};
pub use pagination::{fetch_all, fetch_all_with, FetchSummary, PaginationMode, Progress};
