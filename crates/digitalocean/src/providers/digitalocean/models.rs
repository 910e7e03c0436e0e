//! `DigitalOcean` API request models.
//!
//! Responses are kept as opaque [`serde_json::Value`] documents; only the
//! outgoing creation body is typed.

use serde::Serialize;

/// Default for `monitoring` on new droplets.
pub const DEFAULT_MONITORING: bool = false;

/// Default for `ipv6` on new droplets.
pub const DEFAULT_IPV6: bool = false;

/// Default for `private_networking` on new droplets.
pub const DEFAULT_PRIVATE_NETWORKING: bool = true;

// ============================================================================
// Create Droplet types
// ============================================================================

/// Request body for creating a droplet.
///
/// Optional collections and user data are left out of the JSON body entirely
/// when empty. The API treats an explicit empty value differently from an
/// absent key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateDropletRequest {
    /// Droplet name.
    pub name: String,
    /// Region slug.
    pub region: String,
    /// Size slug.
    pub size: String,
    /// Image ID, image slug or snapshot ID, passed through verbatim.
    pub image: String,
    /// SSH key IDs or fingerprints.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<String>,
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// User data for cloud-init.
    #[serde(skip_serializing_if = "is_blank")]
    pub user_data: Option<String>,
    /// Enable monitoring agent.
    pub monitoring: bool,
    /// Enable IPv6.
    pub ipv6: bool,
    /// Enable private networking.
    pub private_networking: bool,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

impl CreateDropletRequest {
    /// Build a request with the required fields and default flags.
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        size: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            size: size.into(),
            image: image.into(),
            ssh_keys: Vec::new(),
            tags: Vec::new(),
            user_data: None,
            monitoring: DEFAULT_MONITORING,
            ipv6: DEFAULT_IPV6,
            private_networking: DEFAULT_PRIVATE_NETWORKING,
        }
    }

    /// Set SSH keys.
    #[must_use]
    pub fn with_ssh_keys(mut self, ssh_keys: Vec<String>) -> Self {
        self.ssh_keys = ssh_keys;
        self
    }

    /// Set tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set cloud-init user data.
    #[must_use]
    pub fn with_user_data(mut self, user_data: Option<String>) -> Self {
        self.user_data = user_data;
        self
    }

    /// Set the monitoring, IPv6 and private networking flags.
    #[must_use]
    pub fn with_flags(mut self, monitoring: bool, ipv6: bool, private_networking: bool) -> Self {
        self.monitoring = monitoring;
        self.ipv6 = ipv6;
        self.private_networking = private_networking;
        self
    }
}
