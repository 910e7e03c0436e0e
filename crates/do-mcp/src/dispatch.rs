//! Routes tool calls to the droplet API.
//!
//! The API client is built on first use by an injected factory and then
//! reused. A failed build is reported as that call's result and retried on
//! the next call, so a missing token never takes the server down.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use digitalocean::providers::digitalocean::{
    DEFAULT_IPV6, DEFAULT_MONITORING, DEFAULT_PRIVATE_NETWORKING,
};
use digitalocean::{CreateDropletRequest, DoError, DropletApi};

use crate::arguments::Arguments;
use crate::tools::{ToolCatalog, ToolName};

/// Builds the API client on first use.
pub type ClientFactory = Box<dyn Fn() -> Result<Arc<dyn DropletApi>, DoError> + Send + Sync>;

/// Text result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Pretty JSON on success, otherwise a plain-text message.
    pub text: String,
    /// Set when the call failed.
    pub is_error: bool,
}

impl ToolOutput {
    fn success(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    fn error(err: &DoError) -> Self {
        Self {
            text: format!("Error: {err}"),
            is_error: true,
        }
    }

    /// MCP `tools/call` result body.
    #[must_use]
    pub fn to_call_result(&self) -> Value {
        serde_json::json!({
            "content": [{
                "type": "text",
                "text": self.text
            }],
            "isError": self.is_error
        })
    }
}

/// Tool dispatcher owning the lazily-built client.
pub struct Dispatcher {
    catalog: ToolCatalog,
    factory: ClientFactory,
    client: OnceCell<Arc<dyn DropletApi>>,
}

impl Dispatcher {
    /// Create a dispatcher that builds its client with `factory` on first use.
    #[must_use]
    pub fn new(factory: ClientFactory) -> Self {
        Self {
            catalog: ToolCatalog::new(),
            factory,
            client: OnceCell::new(),
        }
    }

    /// Create a dispatcher around an existing client.
    #[must_use]
    pub fn with_client(client: Arc<dyn DropletApi>) -> Self {
        Self {
            catalog: ToolCatalog::new(),
            factory: Box::new(|| {
                Err(DoError::Config("client factory not configured".to_string()))
            }),
            client: OnceCell::new_with(Some(client)),
        }
    }

    /// The tool catalog.
    #[must_use]
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    async fn client(&self) -> Result<&Arc<dyn DropletApi>, DoError> {
        self.client
            .get_or_try_init(|| async { (self.factory)() })
            .await
    }

    /// Run a tool by name.
    ///
    /// Never fails: unknown names produce an "Unknown tool" text and every
    /// error is rendered as `Error: <message>`.
    pub async fn call(&self, name: &str, arguments: &Arguments) -> ToolOutput {
        let Some(tool) = self.catalog.lookup(name) else {
            debug!(tool = %name, "Unknown tool requested");
            return ToolOutput::success(format!("Unknown tool: {name}"));
        };

        let result = match self.client().await {
            Ok(client) => invoke(client.as_ref(), tool, arguments).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(text) => ToolOutput::success(text),
            Err(e) => {
                warn!(tool = %tool, error = %e, "Tool call failed");
                ToolOutput::error(&e)
            }
        }
    }
}

async fn invoke(api: &dyn DropletApi, tool: ToolName, args: &Arguments) -> Result<String, DoError> {
    debug!(tool = %tool, "Invoking tool");
    match tool {
        ToolName::ListRegions => pretty(&api.list_regions().await?),
        ToolName::ListSizes => {
            let sizes = if args.bool_or("gpu_only", false)? {
                api.list_gpu_sizes().await?
            } else {
                api.list_sizes().await?
            };
            pretty(&sizes)
        }
        ToolName::ListSnapshots => pretty(&api.list_snapshots().await?),
        ToolName::GetSnapshot => {
            let snapshot_id = args.required_str("snapshot_id")?;
            pretty(&api.get_snapshot(&snapshot_id).await?)
        }
        ToolName::ListDroplets => pretty(&api.list_droplets().await?),
        ToolName::GetDroplet => {
            let droplet_id = args.required_u64("droplet_id")?;
            pretty(&api.get_droplet(droplet_id).await?)
        }
        ToolName::CreateDroplet => {
            let req = create_request(args)?;
            pretty(&api.create_droplet(&req).await?)
        }
        ToolName::DeleteDroplet => {
            let droplet_id = args.required_u64("droplet_id")?;
            pretty(&api.delete_droplet(droplet_id).await?)
        }
        ToolName::ListSshKeys => pretty(&api.list_ssh_keys().await?),
        ToolName::GetAccountInfo => pretty(&api.get_account().await?),
    }
}

fn create_request(args: &Arguments) -> Result<CreateDropletRequest, DoError> {
    let req = CreateDropletRequest::new(
        args.required_str("name")?,
        args.required_str("region")?,
        args.required_str("size")?,
        args.required_str("image")?,
    )
    .with_ssh_keys(args.string_list("ssh_keys")?)
    .with_tags(args.string_list("tags")?)
    .with_user_data(args.optional_str("user_data")?)
    .with_flags(
        args.bool_or("monitoring", DEFAULT_MONITORING)?,
        args.bool_or("ipv6", DEFAULT_IPV6)?,
        args.bool_or("private_networking", DEFAULT_PRIVATE_NETWORKING)?,
    );
    Ok(req)
}

fn pretty<T: Serialize>(value: &T) -> Result<String, DoError> {
    Ok(serde_json::to_string_pretty(value)?)
}
