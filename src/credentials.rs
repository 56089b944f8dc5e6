//! Stored API credentials and request headers.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::environment::Environment;
use crate::error::{MistError, Result};

/// Directory under the user's home holding one credential file per environment.
pub const CONFIG_DIR_NAME: &str = ".mistrs";

/// API base URL and token for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub api_token: String,
    pub api_url: String,
}

impl Credentials {
    pub fn new(api_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_url: api_url.into(),
        }
    }

    /// Headers every Mist request carries.
    pub fn headers(&self) -> Result<HeaderMap> {
        auth_headers(&self.api_token)
    }
}

/// Build the JSON content type and `Token` authorization headers.
pub fn auth_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let value = HeaderValue::from_str(&format!("Token {token}"))
        .map_err(|_| MistError::InvalidConfig("api token contains invalid characters".into()))?;
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Credential files on disk, one `<env>.env` JSON document per environment.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    /// Store rooted at `$HOME/.mistrs`.
    pub fn default_location() -> Result<Self> {
        let home = home::home_dir().ok_or(MistError::NoHomeDir)?;
        Ok(Self::at(home.join(CONFIG_DIR_NAME)))
    }

    /// Store rooted at an arbitrary directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, env: Environment) -> PathBuf {
        self.dir.join(format!("{}.env", env.key()))
    }

    pub fn exists(&self, env: Environment) -> bool {
        self.path_for(env).is_file()
    }

    /// Load credentials for `env`.
    ///
    /// A missing file, or one without both `api_token` and `api_url`, is
    /// reported as `CredentialsNotFound`.
    pub fn load(&self, env: Environment) -> Result<Credentials> {
        let path = self.path_for(env);
        if !path.is_file() {
            return Err(MistError::CredentialsNotFound(env.key().to_string()));
        }

        let text = fs::read_to_string(&path)?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        let has_keys = ["api_token", "api_url"]
            .iter()
            .all(|key| value.get(key).and_then(|v| v.as_str()).is_some());
        if !has_keys {
            return Err(MistError::CredentialsNotFound(env.key().to_string()));
        }

        debug!(path = %path.display(), "loaded credentials");
        Ok(serde_json::from_value(value)?)
    }

    /// Save a token for `env`, pairing it with the environment's API URL.
    pub fn save(&self, env: Environment, token: &str) -> Result<Credentials> {
        let token = token.trim();
        if token.is_empty() {
            return Err(MistError::EmptyToken);
        }

        fs::create_dir_all(&self.dir)?;
        let credentials = Credentials::new(env.api_url(), token);
        let path = self.path_for(env);
        fs::write(&path, serde_json::to_string_pretty(&credentials)?)?;
        debug!(path = %path.display(), "saved credentials");
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers() {
        let creds = Credentials::new("https://api.mist.com/api/v1/", "abc123");
        let headers = creds.headers().unwrap();
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[AUTHORIZATION], "Token abc123");
    }

    #[test]
    fn test_headers_reject_newline() {
        assert!(auth_headers("bad\ntoken").is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("nested"));

        assert!(!store.exists(Environment::Emea01));
        let saved = store.save(Environment::Emea01, "  tok  ").unwrap();
        assert_eq!(saved.api_token, "tok");
        assert_eq!(saved.api_url, "https://api.eu.mist.com/api/v1/");
        assert!(store.exists(Environment::Emea01));

        let loaded = store.load(Environment::Emea01).unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path());
        let result = store.load(Environment::Global01);
        assert!(matches!(result, Err(MistError::CredentialsNotFound(env)) if env == "global01"));
    }

    #[test]
    fn test_load_incomplete_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path());
        fs::write(store.path_for(Environment::Apac01), r#"{"api_token": "x"}"#).unwrap();
        let result = store.load(Environment::Apac01);
        assert!(matches!(result, Err(MistError::CredentialsNotFound(_))));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path());
        fs::write(store.path_for(Environment::Apac01), "not json").unwrap();
        assert!(matches!(store.load(Environment::Apac01), Err(MistError::Json(_))));
    }

    #[test]
    fn test_save_empty_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path());
        assert!(matches!(
            store.save(Environment::Global02, "   "),
            Err(MistError::EmptyToken)
        ));
    }
}
