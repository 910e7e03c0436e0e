//! `DigitalOcean` API client implementation.
//!
//! API Documentation: <https://docs.digitalocean.com/reference/api/>

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::models::CreateDropletRequest;
use crate::providers::traits::{DoError, DropletApi};

/// Base URL for `DigitalOcean` API.
pub const API_BASE_URL: &str = "https://api.digitalocean.com/v2";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP verbs accepted by [`DigitalOcean::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Whether requests with this verb carry a JSON body.
    #[must_use]
    pub fn takes_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    fn as_reqwest(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = DoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(DoError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reqwest().as_str())
    }
}

/// `DigitalOcean` API client.
#[derive(Clone)]
pub struct DigitalOcean {
    /// HTTP client.
    client: Client,
    /// API token for authentication.
    api_token: String,
    /// Base URL, without trailing slash.
    base_url: String,
}

impl fmt::Debug for DigitalOcean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitalOcean")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DigitalOcean {
    /// Create a new `DigitalOcean` client against the public API.
    ///
    /// # Errors
    /// Returns error if the token is blank or the HTTP client cannot be created.
    pub fn new(api_token: impl Into<String>) -> Result<Self, DoError> {
        Self::with_base_url(api_token, API_BASE_URL)
    }

    /// Create a client against a custom base URL (proxies, mock servers).
    ///
    /// # Errors
    /// Returns error if the token is blank or the HTTP client cannot be created.
    pub fn with_base_url(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, DoError> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(DoError::Config(
                "DIGITALOCEAN_API_TOKEN environment variable is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make an authenticated request and return the parsed JSON body.
    ///
    /// `body` is required for POST and PUT and ignored otherwise. Any
    /// non-success status becomes [`DoError::Api`].
    ///
    /// # Errors
    /// Returns error on a missing body, transport failure, non-success status
    /// or unparseable success body.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, DoError> {
        if method.takes_body() && body.is_none() {
            return Err(DoError::InvalidRequest(format!(
                "{method} {path} requires a request body"
            )));
        }

        let url = format!("{}{path}", self.base_url);
        debug!(method = %method, url = %url, "API request");

        let mut builder = self
            .client
            .request(method.as_reqwest(), &url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json");

        if method.takes_body() {
            if let Some(body) = body {
                builder = builder.json(body);
            }
        }

        let response = builder.send().await?;
        Self::handle_response(response).await
    }

    /// Same as [`request`](Self::request) with the verb given as text.
    ///
    /// # Errors
    /// Returns [`DoError::UnsupportedMethod`] for unknown verbs, before any
    /// network call.
    pub async fn request_str(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, DoError> {
        let method: HttpMethod = method.parse()?;
        self.request(method, path, body).await
    }

    /// Handle API response, parsing JSON or extracting the error message.
    async fn handle_response(response: reqwest::Response) -> Result<Value, DoError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Object(Map::new()));
            }
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                DoError::Serialization(e)
            })
        } else {
            let message = error_message(&text)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| status.to_string());
            Err(DoError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn get_list(&self, path: &str, key: &str) -> Result<Vec<Value>, DoError> {
        let body = self.request(HttpMethod::Get, path, None).await?;
        Ok(envelope_list(body, key))
    }

    async fn get_object(&self, path: &str, key: &str) -> Result<Value, DoError> {
        let body = self.request(HttpMethod::Get, path, None).await?;
        Ok(envelope_object(body, key))
    }
}

/// Pull a human-readable message out of an error body.
///
/// Prefers the JSON `message` field, then the raw text. `None` for an empty body.
fn error_message(text: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        if let Some(message) = map.get("message").and_then(Value::as_str) {
            return Some(message.to_string());
        }
    }
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Unwrap a list envelope such as `{"regions": [...]}`. Missing key → empty list.
fn envelope_list(mut body: Value, key: &str) -> Vec<Value> {
    match body.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Unwrap a single-resource envelope such as `{"droplet": {...}}`.
/// Missing key → empty object.
fn envelope_object(mut body: Value, key: &str) -> Value {
    match body.get_mut(key).map(Value::take) {
        Some(value @ Value::Object(_)) => value,
        _ => Value::Object(Map::new()),
    }
}

#[async_trait]
impl DropletApi for DigitalOcean {
    async fn list_regions(&self) -> Result<Vec<Value>, DoError> {
        self.get_list("/regions", "regions").await
    }

    async fn list_sizes(&self) -> Result<Vec<Value>, DoError> {
        self.get_list("/sizes", "sizes").await
    }

    async fn list_images(&self) -> Result<Vec<Value>, DoError> {
        self.get_list("/images", "images").await
    }

    async fn get_snapshot(&self, snapshot_id: &str) -> Result<Value, DoError> {
        self.get_object(&format!("/snapshots/{snapshot_id}"), "snapshot")
            .await
    }

    async fn list_droplets(&self) -> Result<Vec<Value>, DoError> {
        self.get_list("/droplets", "droplets").await
    }

    async fn get_droplet(&self, droplet_id: u64) -> Result<Value, DoError> {
        self.get_object(&format!("/droplets/{droplet_id}"), "droplet")
            .await
    }

    async fn create_droplet(&self, req: &CreateDropletRequest) -> Result<Value, DoError> {
        info!(
            name = %req.name,
            region = %req.region,
            size = %req.size,
            image = %req.image,
            "Creating droplet"
        );

        let body = serde_json::to_value(req)?;
        let response = self
            .request(HttpMethod::Post, "/droplets", Some(&body))
            .await?;
        let droplet = envelope_object(response, "droplet");

        let id = droplet.get("id").cloned().unwrap_or_default();
        info!(droplet_id = %id, "Droplet created");
        Ok(droplet)
    }

    async fn delete_droplet(&self, droplet_id: u64) -> Result<Value, DoError> {
        info!(droplet_id, "Deleting droplet");
        let response = self
            .request(HttpMethod::Delete, &format!("/droplets/{droplet_id}"), None)
            .await?;
        info!(droplet_id, "Droplet deleted");
        Ok(response)
    }

    async fn list_ssh_keys(&self) -> Result<Vec<Value>, DoError> {
        self.get_list("/account/keys", "ssh_keys").await
    }

    async fn get_account(&self) -> Result<Value, DoError> {
        self.get_object("/account", "account").await
    }
}
