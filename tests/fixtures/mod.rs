// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-cf-domain
//!
//! Builds a seeded in-memory control plane and reconcilers with fast delete
//! confirmation so scenario tests finish in milliseconds.
//!
//! # Seeded state
//! - Organization `org-guid-123` ("pcfdev-org")
//! - Router groups `default-tcp` (tcp) and `default-http` (http)

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use cim_cf_domain::adapters::InMemoryControlPlane;
use cim_cf_domain::domain::{RouterGroup, RouterType};
use cim_cf_domain::{DomainResource, LifecycleManager, ReconcilerConfig, RetryPolicy};

pub const ORG_GUID: &str = "org-guid-123";
pub const ORG_NAME: &str = "pcfdev-org";
pub const OTHER_ORG_GUID: &str = "org-guid-456";

pub const TCP_ROUTER_GROUP: &str = "default-tcp";
pub const HTTP_ROUTER_GROUP: &str = "default-http";

/// Seeded control plane plus the router groups it holds
pub struct Fixture {
    pub plane: Arc<InMemoryControlPlane>,
    pub tcp_group: RouterGroup,
    pub http_group: RouterGroup,
}

/// Control plane with one organization and two router groups
pub fn seeded_plane() -> Fixture {
    let plane = Arc::new(InMemoryControlPlane::new());
    plane.seed_organization(ORG_GUID, ORG_NAME);
    plane.seed_organization(OTHER_ORG_GUID, "other-org");
    let tcp_group = plane.seed_router_group(TCP_ROUTER_GROUP, RouterType::Tcp);
    let http_group = plane.seed_router_group(HTTP_ROUTER_GROUP, RouterType::Http);
    Fixture {
        plane,
        tcp_group,
        http_group,
    }
}

/// Delete confirmation with `attempts` lookups spaced 1ms apart
pub fn fast_config(attempts: u32) -> ReconcilerConfig {
    ReconcilerConfig {
        delete_confirmation: RetryPolicy::fixed(attempts, Duration::from_millis(1)),
        refresh_concurrency: 2,
    }
}

pub fn manager(plane: &Arc<InMemoryControlPlane>, attempts: u32) -> LifecycleManager {
    LifecycleManager::from_control_plane(plane.clone(), fast_config(attempts))
}

pub fn resource(plane: &Arc<InMemoryControlPlane>, attempts: u32) -> DomainResource {
    DomainResource::new(manager(plane, attempts))
}
