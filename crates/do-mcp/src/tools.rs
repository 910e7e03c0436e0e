//! Tool catalog for the `DigitalOcean` MCP server.
//!
//! Tool names and argument names are part of the wire contract.

use std::collections::HashMap;
use std::fmt;

use serde_json::{json, Value};

/// Every tool the server can run, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListRegions,
    ListSizes,
    ListSnapshots,
    GetSnapshot,
    ListDroplets,
    GetDroplet,
    CreateDroplet,
    DeleteDroplet,
    ListSshKeys,
    GetAccountInfo,
}

impl ToolName {
    /// All tools, in the order they are advertised.
    pub const ALL: [Self; 10] = [
        Self::ListRegions,
        Self::ListSizes,
        Self::ListSnapshots,
        Self::GetSnapshot,
        Self::ListDroplets,
        Self::GetDroplet,
        Self::CreateDroplet,
        Self::DeleteDroplet,
        Self::ListSshKeys,
        Self::GetAccountInfo,
    ];

    /// Wire name of the tool.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListRegions => "do_list_regions",
            Self::ListSizes => "do_list_sizes",
            Self::ListSnapshots => "do_list_snapshots",
            Self::GetSnapshot => "do_get_snapshot",
            Self::ListDroplets => "do_list_droplets",
            Self::GetDroplet => "do_get_droplet",
            Self::CreateDroplet => "do_create_droplet",
            Self::DeleteDroplet => "do_delete_droplet",
            Self::ListSshKeys => "do_list_ssh_keys",
            Self::GetAccountInfo => "do_get_account_info",
        }
    }

    /// Full schema entry for `tools/list`.
    #[must_use]
    pub fn schema(self) -> Value {
        match self {
            Self::ListRegions => no_args_schema(self, "List all available DigitalOcean regions"),
            Self::ListSizes => get_list_sizes_schema(),
            Self::ListSnapshots => no_args_schema(self, "List all available snapshots"),
            Self::GetSnapshot => get_snapshot_schema(),
            Self::ListDroplets => no_args_schema(self, "List all droplets in your account"),
            Self::GetDroplet => droplet_id_schema(
                self,
                "Get information about a specific droplet by ID",
                "Droplet ID",
            ),
            Self::CreateDroplet => get_create_droplet_schema(),
            Self::DeleteDroplet => {
                droplet_id_schema(self, "Delete a droplet by ID", "Droplet ID to delete")
            }
            Self::ListSshKeys => no_args_schema(self, "List all SSH keys in your account"),
            Self::GetAccountInfo => no_args_schema(self, "Get account information"),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static catalog with a name index built once.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    by_name: HashMap<&'static str, ToolName>,
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolCatalog {
    /// Build the name index.
    #[must_use]
    pub fn new() -> Self {
        let by_name = ToolName::ALL
            .iter()
            .map(|tool| (tool.as_str(), *tool))
            .collect();
        Self { by_name }
    }

    /// Resolve a wire name. `None` for names outside the catalog.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ToolName> {
        self.by_name.get(name).copied()
    }

    /// Number of tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the catalog has no tools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Get tool schemas for the MCP `tools/list` response.
#[must_use]
pub fn get_tool_schemas() -> Value {
    let tools: Vec<Value> = ToolName::ALL.iter().map(|tool| tool.schema()).collect();
    json!({ "tools": tools })
}

fn no_args_schema(tool: ToolName, description: &str) -> Value {
    json!({
        "name": tool.as_str(),
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": {}
        }
    })
}

fn droplet_id_schema(tool: ToolName, description: &str, arg_description: &str) -> Value {
    json!({
        "name": tool.as_str(),
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": {
                "droplet_id": {
                    "type": "integer",
                    "description": arg_description
                }
            },
            "required": ["droplet_id"]
        }
    })
}

fn get_list_sizes_schema() -> Value {
    json!({
        "name": ToolName::ListSizes.as_str(),
        "description": "List all available droplet sizes (including GPU sizes)",
        "inputSchema": {
            "type": "object",
            "properties": {
                "gpu_only": {
                    "type": "boolean",
                    "description": "If true, only return GPU-enabled sizes",
                    "default": false
                }
            }
        }
    })
}

fn get_snapshot_schema() -> Value {
    json!({
        "name": ToolName::GetSnapshot.as_str(),
        "description": "Get information about a specific snapshot by ID",
        "inputSchema": {
            "type": "object",
            "properties": {
                "snapshot_id": {
                    "type": "string",
                    "description": "Snapshot ID or slug"
                }
            },
            "required": ["snapshot_id"]
        }
    })
}

fn get_create_droplet_schema() -> Value {
    json!({
        "name": ToolName::CreateDroplet.as_str(),
        "description": "Create a new droplet",
        "inputSchema": {
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Droplet name"
                },
                "region": {
                    "type": "string",
                    "description": "Region slug (e.g., 'nyc1', 'sfo3')"
                },
                "size": {
                    "type": "string",
                    "description": "Droplet size slug (e.g., 's-1vcpu-1gb', 'g-2vcpu-16gb')"
                },
                "image": {
                    "type": "string",
                    "description": "Image ID, snapshot ID, or image slug"
                },
                "ssh_keys": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Optional list of SSH key IDs or fingerprints"
                },
                "tags": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Optional list of tags"
                },
                "user_data": {
                    "type": "string",
                    "description": "Optional cloud-init user data"
                },
                "monitoring": {
                    "type": "boolean",
                    "description": "Enable monitoring",
                    "default": false
                },
                "ipv6": {
                    "type": "boolean",
                    "description": "Enable IPv6",
                    "default": false
                },
                "private_networking": {
                    "type": "boolean",
                    "description": "Enable private networking",
                    "default": true
                }
            },
            "required": ["name", "region", "size", "image"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_and_names() {
        let schemas = get_tool_schemas();
        let names: Vec<&str> = schemas["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();

        assert_eq!(
            names,
            vec![
                "do_list_regions",
                "do_list_sizes",
                "do_list_snapshots",
                "do_get_snapshot",
                "do_list_droplets",
                "do_get_droplet",
                "do_create_droplet",
                "do_delete_droplet",
                "do_list_ssh_keys",
                "do_get_account_info",
            ]
        );
    }

    #[test]
    fn test_lookup() {
        let catalog = ToolCatalog::new();
        assert_eq!(catalog.len(), ToolName::ALL.len());
        assert_eq!(catalog.lookup("do_get_droplet"), Some(ToolName::GetDroplet));
        assert_eq!(catalog.lookup("do_reboot_droplet"), None);
        assert_eq!(catalog.lookup("DO_LIST_REGIONS"), None);
    }

    #[test]
    fn test_required_arguments() {
        let create = ToolName::CreateDroplet.schema();
        assert_eq!(
            create["inputSchema"]["required"],
            json!(["name", "region", "size", "image"])
        );
        assert_eq!(
            create["inputSchema"]["properties"]["private_networking"]["default"],
            json!(true)
        );

        let delete = ToolName::DeleteDroplet.schema();
        assert_eq!(delete["inputSchema"]["required"], json!(["droplet_id"]));
        assert_eq!(
            delete["inputSchema"]["properties"]["droplet_id"]["type"],
            "integer"
        );

        let regions = ToolName::ListRegions.schema();
        assert!(regions["inputSchema"].get("required").is_none());
    }
}
