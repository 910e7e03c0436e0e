//! `DigitalOcean` droplet provisioning for GPU workloads.
//!
//! This crate wraps the `DigitalOcean` API v2 for the handful of operations
//! needed to boot GPU droplets from a snapshot:
//!
//! - [`providers::DropletApi`] - provider trait (regions, sizes, images,
//!   snapshots, droplets, SSH keys, account)
//! - [`providers::digitalocean::DigitalOcean`] - REST client implementing it
//! - [`wait`] - poll a droplet until it is active, fails, or times out
//! - [`deploy`] - the snapshot → droplet workflow behind `deploy-gpu-droplet`
//!
//! ## Example
//!
//! ```ignore
//! use digitalocean::{CreateDropletRequest, DigitalOcean, DropletApi};
//! use digitalocean::wait::{wait_for_active, TokioClock, WaitOptions};
//!
//! let api = DigitalOcean::new(token)?;
//!
//! let droplet = api
//!     .create_droplet(&CreateDropletRequest::new("gpu-1", "nyc1", "g-2vcpu-16gb", "12345"))
//!     .await?;
//!
//! let id = digitalocean::deploy::droplet_id(&droplet)?;
//! let active = wait_for_active(&api, &TokioClock, id, WaitOptions::default()).await?;
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod deploy;
pub mod providers;
pub mod wait;

pub use config::{DeployArgs, DeployConfig};
pub use deploy::{deploy, DeployError, DeployProgress, DeployReport, NoProgress};
pub use providers::digitalocean::{CreateDropletRequest, DigitalOcean, HttpMethod};
pub use providers::{DoError, DropletApi};
