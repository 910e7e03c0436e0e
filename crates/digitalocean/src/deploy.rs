//! Single-shot deployment of a GPU droplet from a snapshot.
//!
//! Steps run strictly in order and the first failure aborts the run:
//!
//! 1. verify the snapshot exists
//! 2. list GPU sizes for reference (advisory, never fatal)
//! 3. create the droplet
//! 4. optionally wait for it to become active
//!
//! Each step is reported to a [`DeployProgress`] as soon as it completes, so
//! an operator sees the created droplet even if the wait later fails.

use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::config::DeployConfig;
use crate::providers::{DoError, DropletApi};
use crate::wait::{wait_for_active, Clock};

/// Number of GPU sizes kept in the report.
pub const GPU_SIZES_SHOWN: usize = 5;

/// Observer for workflow steps. Every method defaults to doing nothing.
pub trait DeployProgress: Send + Sync {
    /// The snapshot lookup succeeded.
    fn snapshot_found(&self, _snapshot: &Value) {}

    /// Result of the advisory GPU size lookup. `Ok` holds at most
    /// [`GPU_SIZES_SHOWN`] sizes and may be empty.
    fn gpu_sizes(&self, _sizes: Result<&[Value], &DoError>) {}

    /// The create call returned.
    fn droplet_created(&self, _droplet: &Value) {}

    /// Polling is about to start.
    fn waiting(&self, _droplet_id: u64, _timeout: Duration) {}

    /// The droplet reached `active`.
    fn droplet_active(&self, _droplet: &Value) {}
}

/// Progress sink that ignores every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl DeployProgress for NoProgress {}

/// Everything learned during a successful deployment.
#[derive(Debug, Clone)]
pub struct DeployReport {
    /// Snapshot document returned by the API.
    pub snapshot: Value,
    /// First few GPU sizes, or `None` when the lookup itself failed.
    pub gpu_sizes: Option<Vec<Value>>,
    /// Droplet as returned by the create call.
    pub created: Value,
    /// Final droplet document: the active droplet when waiting, else `created`.
    pub droplet: Value,
    /// Whether the final document came from the poll loop.
    pub waited: bool,
}

/// Deployment failure, carrying the droplet if one was already created.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct DeployError {
    /// Underlying cause.
    #[source]
    pub source: DoError,
    /// Droplet document, when creation succeeded before the failure.
    pub droplet: Option<Value>,
}

impl From<DoError> for DeployError {
    fn from(source: DoError) -> Self {
        Self {
            source,
            droplet: None,
        }
    }
}

/// Extract the integer ID from a droplet document.
///
/// # Errors
/// Returns [`DoError::UnexpectedResponse`] when `id` is missing or not an integer.
pub fn droplet_id(droplet: &Value) -> Result<u64, DoError> {
    droplet
        .get("id")
        .and_then(Value::as_u64)
        .ok_or_else(|| DoError::UnexpectedResponse("droplet response has no numeric id".into()))
}

/// Run the deployment workflow.
///
/// # Errors
/// Any API error aborts the run. Errors after creation carry the created
/// droplet in [`DeployError::droplet`].
pub async fn deploy(
    api: &dyn DropletApi,
    clock: &dyn Clock,
    config: &DeployConfig,
    progress: &dyn DeployProgress,
) -> Result<DeployReport, DeployError> {
    info!(snapshot_id = %config.snapshot_id, "Verifying snapshot");
    let snapshot = api.get_snapshot(&config.snapshot_id).await?;
    progress.snapshot_found(&snapshot);

    let gpu_sizes = match api.list_gpu_sizes().await {
        Ok(sizes) => {
            if sizes.is_empty() {
                warn!("No GPU sizes found; make sure the size slug is GPU-enabled");
            }
            let shown: Vec<Value> = sizes.into_iter().take(GPU_SIZES_SHOWN).collect();
            progress.gpu_sizes(Ok(shown.as_slice()));
            Some(shown)
        }
        Err(e) => {
            warn!(error = %e, "Could not list GPU sizes");
            progress.gpu_sizes(Err(&e));
            None
        }
    };

    let created = api.create_droplet(&config.request).await?;
    progress.droplet_created(&created);

    if !config.wait_for_active {
        return Ok(DeployReport {
            snapshot,
            gpu_sizes,
            droplet: created.clone(),
            created,
            waited: false,
        });
    }

    let id = droplet_id(&created).map_err(|source| DeployError {
        source,
        droplet: Some(created.clone()),
    })?;

    progress.waiting(id, config.wait.timeout);
    match wait_for_active(api, clock, id, config.wait).await {
        Ok(droplet) => {
            progress.droplet_active(&droplet);
            Ok(DeployReport {
                snapshot,
                gpu_sizes,
                created,
                droplet,
                waited: true,
            })
        }
        Err(source) => Err(DeployError {
            source,
            droplet: Some(created),
        }),
    }
}

/// Public IPv4 addresses of a droplet as `(type, ip)` pairs.
#[must_use]
pub fn ipv4_addresses(droplet: &Value) -> Vec<(String, String)> {
    droplet
        .pointer("/networks/v4")
        .and_then(Value::as_array)
        .map(|addrs| {
            addrs
                .iter()
                .map(|addr| {
                    let kind = addr
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown");
                    let ip = addr
                        .get("ip_address")
                        .and_then(Value::as_str)
                        .unwrap_or("N/A");
                    (kind.to_string(), ip.to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}
