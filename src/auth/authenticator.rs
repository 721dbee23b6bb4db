//! Authenticator implementation
//!
//! Handles applying the session token to requests and logging in again
//! when the API rejects it.

use super::types::AuthConfig;
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached session token
    cached_token: Arc<RwLock<Option<String>>>,
    /// HTTP client for login requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config {
            AuthConfig::None => Ok(req),

            AuthConfig::Token { header, token } => Ok(req.header(header.as_str(), token.as_str())),

            AuthConfig::Session { token_header, .. } => {
                let token = self.get_or_login().await?;
                Ok(req.header(token_header.as_str(), token))
            }
        }
    }

    /// Get the cached token, logging in if there is none
    async fn get_or_login(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                return Ok(token.clone());
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have logged in while we waited for the lock
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = self.login().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Exchange key and secret for a session token
    async fn login(&self) -> Result<String> {
        let AuthConfig::Session {
            login_url,
            key,
            secret,
            token_path,
            ..
        } = &self.config
        else {
            return Err(Error::auth("Login not supported for this auth type"));
        };

        debug!(url = %login_url, "Requesting session token");

        let response = self
            .http_client
            .post(login_url)
            .json(&json!({ "key": key, "secret": secret }))
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::AuthStatus {
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await.map_err(Error::Http)?;
        let token = extract_jsonpath(&body, token_path).ok_or_else(|| {
            Error::auth(format!(
                "Login response did not contain a token at '{token_path}'"
            ))
        })?;

        info!("Authenticated with ContentQuo API");
        Ok(token)
    }

    /// Drop the cached token so the next request logs in again
    pub async fn invalidate(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Whether a cached token is present
    pub async fn has_token(&self) -> bool {
        self.cached_token.read().await.is_some()
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Extract a non-empty string from JSON using a simple JSONPath expression
/// Supports basic paths like "$.data.token" or "data.token"
pub fn extract_jsonpath(value: &Value, path: &str) -> Option<String> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    match current {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
