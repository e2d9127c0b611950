// Copyright (c) 2025 - Cowboy AI, Inc.

//! Collaborator implementations
//!
//! - [`memory`]: in-process control plane used by tests and local tooling
//! - `cf_api` (feature `cf-api`): Cloud Controller over HTTP

pub mod memory;

pub use memory::InMemoryControlPlane;

#[cfg(feature = "cf-api")]
pub mod cf_api;

#[cfg(feature = "cf-api")]
pub use cf_api::{CloudControllerClient, CloudControllerConfig};
