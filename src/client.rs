//! HTTP client wrapper for Mist API requests.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::credentials::Credentials;
use crate::error::{MistError, Result};
use crate::pagination;

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and decoded body of a write request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// `true` only for HTTP 200.
    pub success: bool,
    pub status: u16,
    /// JSON body, the raw text as a JSON string if it was not JSON, or `Null` if empty.
    pub body: Value,
}

/// Authenticated client bound to one Mist environment.
#[derive(Debug, Clone)]
pub struct MistClient {
    inner: Client,
    base_url: String,
    headers: HeaderMap,
}

impl MistClient {
    /// Create a client with the given timeout.
    pub fn new(credentials: &Credentials, timeout: Duration) -> Result<Self> {
        let inner = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(false)
            .build()?;
        Ok(Self {
            inner,
            base_url: credentials.api_url.trim_end_matches('/').to_string(),
            headers: credentials.headers()?,
        })
    }

    /// Create a client with the default timeout.
    pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
        Self::new(credentials, DEFAULT_TIMEOUT)
    }

    /// Create a client against a custom base URL (for testing).
    pub fn with_base_url(base_url: &str, token: &str) -> Result<Self> {
        Self::from_credentials(&Credentials::new(base_url, token))
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Full URL for an API path. Absolute URLs pass through unchanged.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, method: Method, path: &str, body: Option<String>) -> Result<Response> {
        let url = self.url(path);
        debug!(%method, %url, "request");
        let mut request = self
            .inner
            .request(method, &url)
            .headers(self.headers.clone());
        if let Some(body) = body {
            request = request.body(body);
        }
        Ok(request.send().await?)
    }

    /// GET a single resource.
    ///
    /// # Errors
    ///
    /// Returns `MistError::HttpStatus` for any non-success status.
    pub async fn get(&self, path: &str) -> Result<Value> {
        let response = self.send(Method::GET, path, None).await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(MistError::http_status(status.as_u16(), text));
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// GET every page of a list endpoint.
    pub async fn get_all(&self, path: &str, config: &FetchConfig) -> Result<Vec<Value>> {
        pagination::fetch_all(&self.inner, &self.url(path), &self.headers, config).await
    }

    /// POST a JSON payload.
    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, data: &T) -> Result<ApiResponse> {
        let payload = serde_json::to_string(data)?;
        let response = self.send(Method::POST, path, Some(payload)).await?;
        into_api_response(response).await
    }

    /// PUT a JSON payload.
    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, data: &T) -> Result<ApiResponse> {
        let payload = serde_json::to_string(data)?;
        let response = self.send(Method::PUT, path, Some(payload)).await?;
        into_api_response(response).await
    }

    /// DELETE the resource at `path`.
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        let response = self.send(Method::DELETE, path, None).await?;
        into_api_response(response).await
    }

    /// Information about the token's owner and privileges.
    pub async fn self_info(&self) -> Result<Value> {
        self.get("self").await
    }
}

/// Decode a write response. Non-200 statuses are reported, not raised.
async fn into_api_response(response: Response) -> Result<ApiResponse> {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let text = response.text().await?;
    let body = decode_body(&text);

    let success = status == 200;
    if success {
        info!(%url, "done");
    } else {
        warn!(%url, status, "request failed");
    }
    Ok(ApiResponse {
        success,
        status,
        body,
    })
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_timeout() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = MistClient::with_base_url("https://api.mist.com/api/v1/", "t").unwrap();
        assert_eq!(client.base_url(), "https://api.mist.com/api/v1");
    }

    #[test]
    fn test_url_join() {
        let client = MistClient::with_base_url("https://api.mist.com/api/v1/", "t").unwrap();
        assert_eq!(client.url("self"), "https://api.mist.com/api/v1/self");
        assert_eq!(
            client.url("/orgs/1/sites"),
            "https://api.mist.com/api/v1/orgs/1/sites"
        );
        assert_eq!(client.url("https://other/x"), "https://other/x");
    }

    #[test]
    fn test_client_carries_auth_headers() {
        let client = MistClient::with_base_url("http://localhost:8080", "secret").unwrap();
        assert_eq!(client.headers()["authorization"], "Token secret");
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body(r#"{"id": 1}"#), json!({"id": 1}));
        assert_eq!(decode_body("plain"), json!("plain"));
    }
}
