//! Droplet provider implementations.
//!
//! This module contains the [`DropletApi`] trait and the `DigitalOcean`
//! REST client implementing it.

pub mod digitalocean;
pub mod traits;

pub use traits::{DoError, DropletApi};
