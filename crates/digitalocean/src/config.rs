//! Configuration for the droplet deployment workflow.
//!
//! Every option can be given as a flag or through its environment variable.

use std::time::Duration;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};

use crate::providers::digitalocean::{CreateDropletRequest, API_BASE_URL};
use crate::providers::DoError;
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_WAIT_TIMEOUT_SECS};

/// Deploy a GPU droplet from a snapshot.
#[derive(Debug, Clone, Parser)]
#[command(name = "deploy-gpu-droplet")]
#[command(about = "Create a GPU droplet from a snapshot and wait until it is active")]
#[command(args_override_self = true)]
pub struct DeployArgs {
    /// `DigitalOcean` API token.
    #[arg(long, env = "DIGITALOCEAN_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// API base URL.
    #[arg(long, env = "DIGITALOCEAN_API_URL", default_value = API_BASE_URL)]
    pub api_url: String,

    /// Droplet name.
    #[arg(long, env = "DROPLET_NAME", default_value = "gpu-droplet")]
    pub name: String,

    /// Region slug (e.g. nyc1, sfo3).
    #[arg(long, env = "DROPLET_REGION", default_value = "nyc1")]
    pub region: String,

    /// Size slug; must be a GPU size.
    #[arg(long, env = "DROPLET_SIZE", default_value = "g-2vcpu-16gb")]
    pub size: String,

    /// Snapshot ID or slug to create the droplet from.
    #[arg(long, env = "SNAPSHOT_ID")]
    pub snapshot_id: Option<String>,

    /// SSH key IDs or fingerprints (comma-separated).
    #[arg(long, env = "SSH_KEYS")]
    pub ssh_keys: Option<String>,

    /// Tags (comma-separated).
    #[arg(long, env = "DROPLET_TAGS")]
    pub tags: Option<String>,

    /// Cloud-init user data.
    #[arg(long, env = "DROPLET_USER_DATA")]
    pub user_data: Option<String>,

    /// Enable the monitoring agent.
    #[arg(long, env = "MONITORING", default_value = "false", action = ArgAction::Set, value_parser = parse_flag)]
    pub monitoring: bool,

    /// Enable IPv6.
    #[arg(long, env = "IPV6", default_value = "false", action = ArgAction::Set, value_parser = parse_flag)]
    pub ipv6: bool,

    /// Enable private networking.
    #[arg(long, env = "PRIVATE_NETWORKING", default_value = "true", action = ArgAction::Set, value_parser = parse_flag)]
    pub private_networking: bool,

    /// Block until the droplet is active.
    #[arg(long, env = "WAIT_FOR_ACTIVE", default_value = "true", action = ArgAction::Set, value_parser = parse_flag)]
    pub wait_for_active: bool,

    /// Wait budget in seconds.
    #[arg(long, env = "WAIT_TIMEOUT_SECS", default_value_t = DEFAULT_WAIT_TIMEOUT_SECS)]
    pub wait_timeout: u64,

    /// Seconds between status polls.
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub poll_interval: u64,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

/// Flags are on only when the value is "true", in any case.
#[allow(clippy::unnecessary_wraps)]
fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(value.trim().eq_ignore_ascii_case("true"))
}

/// Whether a parse error is a help or version request rather than bad input.
///
/// Everything else is a validation failure and exits with status 1.
#[must_use]
pub fn is_informational(err: &clap::Error) -> bool {
    matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

/// Split a comma-separated list. Absent or empty input means "not provided".
#[must_use]
pub fn split_list(value: Option<&str>) -> Vec<String> {
    match value {
        Some(s) if !s.is_empty() => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Validated deployment settings.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// API token.
    pub api_token: String,
    /// API base URL.
    pub api_url: String,
    /// Snapshot to verify and boot from.
    pub snapshot_id: String,
    /// Creation body sent to the API.
    pub request: CreateDropletRequest,
    /// Whether to block until active.
    pub wait_for_active: bool,
    /// Poll timing.
    pub wait: WaitOptions,
}

impl DeployArgs {
    /// Validate required inputs and build the deployment settings.
    ///
    /// # Errors
    /// Returns [`DoError::Config`] naming the missing variable when the token
    /// or snapshot ID is absent.
    pub fn into_config(self) -> Result<DeployConfig, DoError> {
        let api_token = non_empty(self.api_token).ok_or_else(|| {
            DoError::Config(
                "DIGITALOCEAN_API_TOKEN environment variable not set. \
                 Set it with: export DIGITALOCEAN_API_TOKEN='your-token'"
                    .to_string(),
            )
        })?;

        let snapshot_id = non_empty(self.snapshot_id).ok_or_else(|| {
            DoError::Config(
                "SNAPSHOT_ID environment variable is required. \
                 Set it with: export SNAPSHOT_ID='snapshot-id-or-slug'"
                    .to_string(),
            )
        })?;

        let request = CreateDropletRequest::new(self.name, self.region, self.size, &snapshot_id)
            .with_ssh_keys(split_list(self.ssh_keys.as_deref()))
            .with_tags(split_list(self.tags.as_deref()))
            .with_user_data(non_empty(self.user_data))
            .with_flags(self.monitoring, self.ipv6, self.private_networking);

        Ok(DeployConfig {
            api_token,
            api_url: self.api_url,
            snapshot_id,
            request,
            wait_for_active: self.wait_for_active,
            wait: WaitOptions {
                interval: Duration::from_secs(self.poll_interval),
                timeout: Duration::from_secs(self.wait_timeout),
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
