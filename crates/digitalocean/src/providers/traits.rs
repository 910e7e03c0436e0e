//! Droplet API trait and common types.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::digitalocean::filters::{gpu_sizes, snapshots_from_images};
use super::digitalocean::CreateDropletRequest;

/// Errors that can occur while talking to the `DigitalOcean` API.
#[derive(Error, Debug)]
pub enum DoError {
    /// HTTP transport failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    ///
    /// `message` is the `message` field of the JSON error body when present,
    /// otherwise the raw response text.
    #[error("API Error: {message}")]
    Api { status: u16, message: String },

    /// HTTP verb outside GET/POST/PUT/DELETE.
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Request rejected locally before any network call.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response parsed but lacked a field we depend on.
    #[error("Unexpected API response: {0}")]
    UnexpectedResponse(String),

    /// Droplet reported status `error` while being polled.
    #[error("Droplet {droplet_id} entered error state")]
    DropletFailed { droplet_id: u64 },

    /// Droplet was still pending when the wait budget ran out.
    #[error("Droplet {droplet_id} did not become active within {seconds} seconds")]
    Timeout { droplet_id: u64, seconds: u64 },

    /// A required tool argument was not supplied.
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// A tool argument had the wrong type.
    #[error("Invalid argument '{name}': expected {expected}")]
    InvalidArgument {
        name: String,
        expected: &'static str,
    },
}

/// Operations exposed by a droplet provider.
///
/// Resources are returned as opaque JSON documents, unwrapped from the
/// response envelope. Nothing is cached: every call is a fresh request.
#[async_trait]
pub trait DropletApi: Send + Sync {
    /// List all regions.
    async fn list_regions(&self) -> Result<Vec<Value>, DoError>;

    /// List all droplet sizes.
    async fn list_sizes(&self) -> Result<Vec<Value>, DoError>;

    /// List sizes whose description mentions a GPU.
    async fn list_gpu_sizes(&self) -> Result<Vec<Value>, DoError> {
        Ok(gpu_sizes(self.list_sizes().await?))
    }

    /// List all images visible to the account.
    async fn list_images(&self) -> Result<Vec<Value>, DoError>;

    /// List images of type `snapshot`.
    async fn list_snapshots(&self) -> Result<Vec<Value>, DoError> {
        Ok(snapshots_from_images(self.list_images().await?))
    }

    /// Get a snapshot by ID or slug.
    async fn get_snapshot(&self, snapshot_id: &str) -> Result<Value, DoError>;

    /// List all droplets.
    async fn list_droplets(&self) -> Result<Vec<Value>, DoError>;

    /// Get a droplet by ID.
    async fn get_droplet(&self, droplet_id: u64) -> Result<Value, DoError>;

    /// Create a droplet.
    async fn create_droplet(&self, req: &CreateDropletRequest) -> Result<Value, DoError>;

    /// Delete a droplet. Returns the response body (`{}` when empty).
    async fn delete_droplet(&self, droplet_id: u64) -> Result<Value, DoError>;

    /// List SSH keys registered on the account.
    async fn list_ssh_keys(&self) -> Result<Vec<Value>, DoError>;

    /// Get account information.
    async fn get_account(&self) -> Result<Value, DoError>;
}
