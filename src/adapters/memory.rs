// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory control plane for testing.
//!
//! [`InMemoryControlPlane`] implements all three collaborator traits over a
//! single mutex-protected state. It mimics the parts of the platform the
//! reconciler cares about:
//!
//! - domain names are unique across shared and private domains
//! - deleted domains can stay visible to name queries for a configurable
//!   number of lookups (eventual consistency)
//! - failures can be injected into list, get, create and delete calls
//!
//! ## Limitations
//!
//! - **NOT suitable for production**: single process, no persistence
//! - `seed_*` helpers bypass uniqueness checks on purpose

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::api::{DomainApi, OrganizationApi, RouterGroupApi};
use crate::domain::{
    DomainEntity, DomainKind, DomainScope, Guid, NewDomain, Organization, RouterBinding,
    RouterGroup, RouterType,
};
use crate::errors::{ApiError, ApiResult, RemoteError, RemoteResource};

#[derive(Debug, Clone)]
struct StoredDomain {
    entity: DomainEntity,
    deleted: bool,
    /// Name lookups that still see the domain after deletion
    lingering_lookups: u32,
}

impl StoredDomain {
    fn visible_to_lists(&self) -> bool {
        !self.deleted || self.lingering_lookups > 0
    }
}

#[derive(Debug, Default)]
struct PlaneState {
    domains: Vec<StoredDomain>,
    router_groups: Vec<RouterGroup>,
    organizations: HashMap<Guid, Organization>,
    delete_visibility_lag: u32,
    failing_lists: u32,
    list_failure: Option<RemoteError>,
    get_failure: Option<ApiError>,
    create_failure: Option<ApiError>,
    delete_failure: Option<ApiError>,
    list_calls: usize,
    create_calls: usize,
    delete_calls: usize,
}

/// In-memory implementation of the domain, router-group and organization APIs
#[derive(Debug, Default)]
pub struct InMemoryControlPlane {
    state: Mutex<PlaneState>,
}

impl InMemoryControlPlane {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, PlaneState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keep deleted domains visible to this many name lookups
    pub fn set_delete_visibility_lag(&self, lookups: u32) {
        self.state().delete_visibility_lag = lookups;
    }

    /// Fail the next `count` list calls (domains and router groups)
    pub fn fail_next_lists(&self, count: u32, error: RemoteError) {
        let mut state = self.state();
        state.failing_lists = count;
        state.list_failure = Some(error);
    }

    /// Fail the next get call (domain, router group or organization)
    pub fn fail_next_get(&self, error: impl Into<ApiError>) {
        self.state().get_failure = Some(error.into());
    }

    /// Fail the next create call
    pub fn fail_next_create(&self, error: impl Into<ApiError>) {
        self.state().create_failure = Some(error.into());
    }

    /// Fail the next delete call; the domain stays in place
    pub fn fail_next_delete(&self, error: impl Into<ApiError>) {
        self.state().delete_failure = Some(error.into());
    }

    /// Insert a domain directly, skipping every check
    pub fn seed_domain(&self, name: &str, scope: DomainScope) -> DomainEntity {
        let entity = DomainEntity {
            guid: Guid::generate(),
            name: name.to_string(),
            scope,
        };
        self.state().domains.push(StoredDomain {
            entity: entity.clone(),
            deleted: false,
            lingering_lookups: 0,
        });
        entity
    }

    /// Insert a router group
    pub fn seed_router_group(&self, name: &str, router_type: RouterType) -> RouterGroup {
        let group = RouterGroup {
            guid: Guid::generate(),
            name: name.to_string(),
            router_type,
        };
        self.state().router_groups.push(group.clone());
        group
    }

    /// Insert an organization with a known GUID
    pub fn seed_organization(&self, guid: &str, name: &str) -> Organization {
        let org = Organization {
            guid: Guid::new(guid),
            name: name.to_string(),
        };
        self.state().organizations.insert(org.guid.clone(), org.clone());
        org
    }

    /// Whether a live (not deleted) domain has this GUID
    pub fn contains(&self, guid: &Guid) -> bool {
        self.state()
            .domains
            .iter()
            .any(|d| !d.deleted && &d.entity.guid == guid)
    }

    /// Live domains, in creation order
    pub fn live_domains(&self) -> Vec<DomainEntity> {
        self.state()
            .domains
            .iter()
            .filter(|d| !d.deleted)
            .map(|d| d.entity.clone())
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.state().list_calls
    }

    pub fn create_calls(&self) -> usize {
        self.state().create_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state().delete_calls
    }

    fn take_list_failure(state: &mut PlaneState) -> Option<RemoteError> {
        if state.failing_lists == 0 {
            return None;
        }
        state.failing_lists -= 1;
        state.list_failure.clone()
    }
}

fn not_found(resource: RemoteResource, key: impl ToString) -> ApiError {
    ApiError::NotFound {
        resource,
        key: key.to_string(),
    }
}

#[async_trait]
impl DomainApi for InMemoryControlPlane {
    async fn list_domains(&self, kind: DomainKind, name: &str) -> ApiResult<Vec<DomainEntity>> {
        let mut state = self.state();
        state.list_calls += 1;
        if let Some(err) = Self::take_list_failure(&mut state) {
            return Err(err.into());
        }

        let mut found = Vec::new();
        for stored in state.domains.iter_mut() {
            if stored.entity.kind() != kind
                || !stored.entity.name.eq_ignore_ascii_case(name)
                || !stored.visible_to_lists()
            {
                continue;
            }
            if stored.deleted {
                stored.lingering_lookups -= 1;
            }
            found.push(stored.entity.clone());
        }
        Ok(found)
    }

    async fn create_domain(&self, request: &NewDomain) -> ApiResult<DomainEntity> {
        let mut state = self.state();
        state.create_calls += 1;
        if let Some(err) = state.create_failure.take() {
            return Err(err);
        }

        let name = request.name().to_ascii_lowercase();
        if state
            .domains
            .iter()
            .any(|d| !d.deleted && d.entity.name.eq_ignore_ascii_case(&name))
        {
            return Err(RemoteError::with_status(
                400,
                Some("CF-DomainNameTaken".to_string()),
                format!("The domain name is taken: {}", name),
            )
            .into());
        }

        let scope = match request {
            NewDomain::Shared {
                router_group_guid, ..
            } => {
                let router = match router_group_guid {
                    None => None,
                    Some(guid) => {
                        let group = state
                            .router_groups
                            .iter()
                            .find(|g| &g.guid == guid)
                            .ok_or_else(|| {
                                RemoteError::with_status(
                                    400,
                                    Some("CF-RouterGroupNotFound".to_string()),
                                    format!("Router group could not be found: {}", guid),
                                )
                            })?;
                        Some(RouterBinding {
                            router_group_guid: group.guid.clone(),
                            router_type: group.router_type,
                        })
                    }
                };
                DomainScope::Shared { router }
            }
            NewDomain::Private {
                organization_guid, ..
            } => DomainScope::Private {
                owning_organization_guid: organization_guid.clone(),
            },
        };

        let entity = DomainEntity {
            guid: Guid::generate(),
            name,
            scope,
        };
        debug!("In-memory create of {} domain {}", entity.kind(), entity.name);
        state.domains.push(StoredDomain {
            entity: entity.clone(),
            deleted: false,
            lingering_lookups: 0,
        });
        Ok(entity)
    }

    async fn get_domain(&self, kind: DomainKind, guid: &Guid) -> ApiResult<DomainEntity> {
        let mut state = self.state();
        if let Some(err) = state.get_failure.take() {
            return Err(err);
        }
        state
            .domains
            .iter()
            .find(|d| !d.deleted && &d.entity.guid == guid && d.entity.kind() == kind)
            .map(|d| d.entity.clone())
            .ok_or_else(|| not_found(RemoteResource::domain(kind), guid))
    }

    async fn delete_domain(&self, kind: DomainKind, guid: &Guid) -> ApiResult<()> {
        let mut state = self.state();
        state.delete_calls += 1;
        if let Some(err) = state.delete_failure.take() {
            return Err(err);
        }
        let lag = state.delete_visibility_lag;

        let stored = state
            .domains
            .iter_mut()
            .find(|d| !d.deleted && &d.entity.guid == guid && d.entity.kind() == kind)
            .ok_or_else(|| not_found(RemoteResource::domain(kind), guid))?;
        stored.deleted = true;
        stored.lingering_lookups = lag;
        Ok(())
    }
}

#[async_trait]
impl RouterGroupApi for InMemoryControlPlane {
    async fn list_router_groups(&self, name: Option<&str>) -> ApiResult<Vec<RouterGroup>> {
        let mut state = self.state();
        state.list_calls += 1;
        if let Some(err) = Self::take_list_failure(&mut state) {
            return Err(err.into());
        }

        Ok(state
            .router_groups
            .iter()
            .filter(|g| name.map_or(true, |n| g.name == n))
            .cloned()
            .collect())
    }

    async fn get_router_group(&self, guid: &Guid) -> ApiResult<RouterGroup> {
        let mut state = self.state();
        if let Some(err) = state.get_failure.take() {
            return Err(err);
        }
        state
            .router_groups
            .iter()
            .find(|g| &g.guid == guid)
            .cloned()
            .ok_or_else(|| not_found(RemoteResource::RouterGroup, guid))
    }
}

#[async_trait]
impl OrganizationApi for InMemoryControlPlane {
    async fn get_organization(&self, guid: &Guid) -> ApiResult<Organization> {
        let mut state = self.state();
        if let Some(err) = state.get_failure.take() {
            return Err(err);
        }
        state
            .organizations
            .get(guid)
            .cloned()
            .ok_or_else(|| not_found(RemoteResource::Organization, guid))
    }
}
