//! `DigitalOcean` API v2 provider.
//!
//! Implements the [`DropletApi`](crate::providers::DropletApi) trait over the
//! public REST API.
//!
//! ## GPU Sizes
//!
//! GPU droplet sizes are not exposed through a dedicated endpoint. They are
//! picked out of `/sizes` by looking for "gpu" in each size's description,
//! e.g. `g-2vcpu-16gb`, `gpu-h100x1-80gb`.

mod client;
pub mod filters;
mod models;

pub use client::{DigitalOcean, HttpMethod, API_BASE_URL};
pub use models::*;
