//! MCP tool server for `DigitalOcean` droplet operations.
//!
//! Speaks newline-delimited JSON-RPC 2.0 on stdio and maps `tools/call`
//! onto the [`digitalocean`] client.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod arguments;
pub mod config;
pub mod dispatch;
pub mod server;
pub mod tools;

pub use arguments::Arguments;
pub use config::McpConfig;
pub use dispatch::{ClientFactory, Dispatcher, ToolOutput};
pub use server::{rpc_loop, McpServer};
pub use tools::{get_tool_schemas, ToolCatalog, ToolName};
