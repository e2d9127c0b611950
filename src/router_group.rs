// Copyright (c) 2025 - Cowboy AI, Inc.
//! Router Group Resolver
//!
//! Turns whatever the user wrote for `router_group` into a concrete remote
//! router group. A UUID-shaped value is tried as a GUID first; anything else
//! (or a GUID that turns out not to exist) is looked up by name.

use std::sync::Arc;

use tracing::debug;

use crate::api::RouterGroupApi;
use crate::domain::{Guid, RouterGroup};
use crate::errors::{ApiError, DomainError, DomainResult, RemoteResource};

/// Resolves router groups by GUID or name
#[derive(Clone)]
pub struct RouterGroupResolver {
    router_groups: Arc<dyn RouterGroupApi>,
}

impl RouterGroupResolver {
    pub fn new(router_groups: Arc<dyn RouterGroupApi>) -> Self {
        Self { router_groups }
    }

    /// Resolve a GUID or a human name
    ///
    /// # Errors
    /// - `NotFound` when no router group matches
    /// - `AmbiguousResult` when a name matches several groups
    /// - `Remote` on collaborator failure
    pub async fn resolve(&self, name_or_guid: &str) -> DomainResult<RouterGroup> {
        let key = name_or_guid.trim();

        if Guid::looks_like_uuid(key) {
            match self.router_groups.get_router_group(&Guid::new(key)).await {
                Ok(group) => {
                    debug!("Resolved router group {} by GUID ({})", group.name, group.guid);
                    return Ok(group);
                }
                Err(ApiError::NotFound { .. }) => {
                    debug!("No router group with GUID {}, trying it as a name", key);
                }
                Err(err) => return Err(err.into()),
            }
        }

        self.resolve_by_name(key).await
    }

    async fn resolve_by_name(&self, name: &str) -> DomainResult<RouterGroup> {
        let mut matches: Vec<RouterGroup> = self
            .router_groups
            .list_router_groups(Some(name))
            .await?
            .into_iter()
            .filter(|g| g.name == name)
            .collect();

        match matches.len() {
            0 => Err(DomainError::NotFound {
                resource: RemoteResource::RouterGroup,
                key: name.to_string(),
            }),
            1 => {
                let group = matches.remove(0);
                debug!(
                    "Resolved router group '{}' to {} ({})",
                    name, group.guid, group.router_type
                );
                Ok(group)
            }
            count => Err(DomainError::AmbiguousResult {
                resource: RemoteResource::RouterGroup,
                key: name.to_string(),
                count,
            }),
        }
    }
}
