// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reconciliation Adapter
//!
//! Maps between [`DomainEntity`] and the flat [`TrackedState`] a generic
//! state-tracking engine stores. The adapter is the only place that knows
//! the attribute names; the lifecycle manager never sees a `TrackedState`.
//!
//! # Schema
//!
//! | attribute      | declared | computed | forces replace |
//! |----------------|----------|----------|----------------|
//! | `name`         | optional | yes      | yes            |
//! | `sub_domain`   | optional | yes      | via `name`     |
//! | `domain`       | optional | yes      | via `name`     |
//! | `org`          | optional | no       | yes            |
//! | `router_group` | optional | no       | yes            |
//! | `router_type`  | no       | yes      | no             |
//!
//! Domains cannot be updated in place; any identity difference is resolved
//! by delete-then-create. `sub_domain` and `domain` only matter through the
//! name they spell: a different split of the same name is recorded in place.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{classify, DomainEntity, DomainKind, DomainName, DomainSpec, Guid};
use crate::errors::{DomainError, DomainResult};
use crate::lifecycle::LifecycleManager;

pub const ATTR_NAME: &str = "name";
pub const ATTR_SUB_DOMAIN: &str = "sub_domain";
pub const ATTR_DOMAIN: &str = "domain";
pub const ATTR_ORG: &str = "org";
pub const ATTR_ROUTER_GROUP: &str = "router_group";
pub const ATTR_ROUTER_TYPE: &str = "router_type";

/// One attribute of the resource schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    /// May be set in the declared spec
    pub declarable: bool,
    /// Filled in from remote state when not declared
    pub computed: bool,
    /// A change cannot be applied in place
    pub force_new: bool,
}

/// Attribute schema of the domain resource
pub const SCHEMA: &[FieldSchema] = &[
    FieldSchema {
        name: ATTR_NAME,
        declarable: true,
        computed: true,
        force_new: true,
    },
    FieldSchema {
        name: ATTR_SUB_DOMAIN,
        declarable: true,
        computed: true,
        force_new: false,
    },
    FieldSchema {
        name: ATTR_DOMAIN,
        declarable: true,
        computed: true,
        force_new: false,
    },
    FieldSchema {
        name: ATTR_ORG,
        declarable: true,
        computed: false,
        force_new: true,
    },
    FieldSchema {
        name: ATTR_ROUTER_GROUP,
        declarable: true,
        computed: false,
        force_new: true,
    },
    FieldSchema {
        name: ATTR_ROUTER_TYPE,
        declarable: false,
        computed: true,
        force_new: false,
    },
];

/// Persisted view of one domain resource
///
/// `id` is the remote GUID. Kind is not stored separately: a state carrying
/// `org` is private, anything else is shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedState {
    pub id: Guid,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl TrackedState {
    pub fn new(id: Guid) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn kind(&self) -> DomainKind {
        if self.get(ATTR_ORG).is_some() {
            DomainKind::Private
        } else {
            DomainKind::Shared
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.get(ATTR_NAME)
    }

    fn from_entity(entity: &DomainEntity, sub_domain: &str, domain: &str) -> Self {
        let mut state = Self::new(entity.guid.clone());
        state.set(ATTR_NAME, entity.name.to_ascii_lowercase());
        state.set(ATTR_SUB_DOMAIN, sub_domain);
        state.set(ATTR_DOMAIN, domain);
        if let Some(org) = entity.owning_organization_guid() {
            state.set(ATTR_ORG, org.as_str());
        }
        if let Some(router_group) = entity.router_group_guid() {
            state.set(ATTR_ROUTER_GROUP, router_group.as_str());
        }
        if let Some(router_type) = entity.router_type() {
            state.set(ATTR_ROUTER_TYPE, router_type.as_str());
        }
        state
    }
}

/// Split a remote name at its first dot
fn split_remote_name(name: &str) -> (String, String) {
    match DomainName::new(name) {
        Ok(canonical) => {
            let (sub_domain, domain) = canonical.split_first();
            (sub_domain.to_string(), domain.to_string())
        }
        Err(_) => {
            let lower = name.to_ascii_lowercase();
            match lower.split_once('.') {
                Some((sub_domain, domain)) => (sub_domain.to_string(), domain.to_string()),
                None => (lower, String::new()),
            }
        }
    }
}

/// What it takes to move a tracked state to a declared spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Plan {
    /// Nothing tracked yet
    Create,
    /// Tracked state already matches
    NoChange,
    /// Identity changed; delete then create
    Replace { fields: Vec<String> },
}

/// Hooks a generic state-tracking engine drives
#[async_trait]
pub trait ResourceHooks: Send + Sync {
    /// Declared desired state
    type Spec: Send + Sync;

    /// Create the resource and return its first tracked state
    async fn create(&self, spec: &Self::Spec) -> DomainResult<TrackedState>;

    /// Refresh a tracked state; `None` when the resource is gone
    async fn read(&self, state: &TrackedState) -> DomainResult<Option<TrackedState>>;

    /// Delete the resource a state points to
    async fn delete(&self, state: &TrackedState) -> DomainResult<()>;
}

/// Domain resource: `ResourceHooks` plus plan/apply/import helpers
#[derive(Clone)]
pub struct DomainResource {
    manager: LifecycleManager,
}

impl DomainResource {
    pub fn new(manager: LifecycleManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &LifecycleManager {
        &self.manager
    }

    /// Compare a declared spec against what is tracked
    ///
    /// A declared router-group name is resolved to its GUID before it is
    /// compared with the stored GUID.
    pub async fn plan(
        &self,
        spec: &DomainSpec,
        state: Option<&TrackedState>,
    ) -> DomainResult<Plan> {
        let classified = classify(spec)?;
        let state = match state {
            None => return Ok(Plan::Create),
            Some(state) => state,
        };

        let mut fields = Vec::new();

        if state.name() != Some(classified.name.as_str()) {
            fields.push(ATTR_NAME.to_string());
        }
        if spec.org() != state.get(ATTR_ORG) {
            fields.push(ATTR_ORG.to_string());
        }

        let desired_router_group = match spec.router_group() {
            None => None,
            Some(router_group) if state.get(ATTR_ROUTER_GROUP) == Some(router_group) => {
                Some(router_group.to_string())
            }
            Some(router_group) => match self.manager.resolver().resolve(router_group).await {
                Ok(group) => Some(group.guid.to_string()),
                // Unknown groups surface on create; for planning they differ
                Err(err) if err.is_not_found() => Some(router_group.to_string()),
                Err(err) => return Err(err),
            },
        };
        if desired_router_group.as_deref() != state.get(ATTR_ROUTER_GROUP) {
            fields.push(ATTR_ROUTER_GROUP.to_string());
        }

        if fields.is_empty() {
            debug!("Plan for '{}': no change", classified.name);
            Ok(Plan::NoChange)
        } else {
            info!(
                "Plan for '{}': replace ({})",
                classified.name,
                fields.join(", ")
            );
            Ok(Plan::Replace { fields })
        }
    }

    /// Bring remote state in line with `spec`
    ///
    /// Returns the new tracked state. A tracked domain that disappeared is
    /// created again. A re-split of the same name (`a.b` + `example.com` to
    /// `a` + `b.example.com`) addresses the same remote domain, so it is
    /// recorded without a replace.
    pub async fn apply(
        &self,
        spec: &DomainSpec,
        state: Option<&TrackedState>,
    ) -> DomainResult<TrackedState> {
        match (self.plan(spec, state).await?, state) {
            (Plan::NoChange, Some(state)) => match self.read(state).await? {
                Some(mut refreshed) => {
                    let classified = classify(spec)?;
                    if refreshed.get(ATTR_SUB_DOMAIN) != Some(classified.sub_domain.as_str())
                        || refreshed.get(ATTR_DOMAIN) != Some(classified.domain.as_str())
                    {
                        debug!(
                            "Recording declared split '{}' + '{}' for '{}'",
                            classified.sub_domain, classified.domain, classified.name
                        );
                        refreshed.set(ATTR_SUB_DOMAIN, classified.sub_domain.as_str());
                        refreshed.set(ATTR_DOMAIN, classified.domain.as_str());
                    }
                    Ok(refreshed)
                }
                None => {
                    info!("Tracked domain {} vanished, creating again", state.id);
                    self.create(spec).await
                }
            },
            (Plan::Replace { .. }, Some(state)) => {
                self.delete(state).await?;
                self.create(spec).await
            }
            _ => self.create(spec).await,
        }
    }

    /// Tracked state for an existing domain, looked up by GUID
    pub async fn import(&self, guid: &Guid) -> DomainResult<TrackedState> {
        let entity = self.manager.find_by_guid(guid).await?;
        let (sub_domain, domain) = split_remote_name(&entity.name);
        info!("Imported {} domain '{}' ({})", entity.kind(), entity.name, guid);
        Ok(TrackedState::from_entity(&entity, &sub_domain, &domain))
    }

    /// Refresh many tracked states with bounded concurrency
    ///
    /// Results come back in input order.
    pub async fn refresh_all(
        &self,
        states: Vec<TrackedState>,
    ) -> Vec<DomainResult<Option<TrackedState>>> {
        let concurrency = self.manager.config().refresh_concurrency.max(1);
        debug!(
            "Refreshing {} tracked domain(s), {} at a time",
            states.len(),
            concurrency
        );
        stream::iter(states)
            .map(|state| async move { self.read(&state).await })
            .buffered(concurrency)
            .collect()
            .await
    }
}

#[async_trait]
impl ResourceHooks for DomainResource {
    type Spec = DomainSpec;

    async fn create(&self, spec: &DomainSpec) -> DomainResult<TrackedState> {
        let classified = classify(spec)?;
        let entity = self.manager.create_classified(spec, &classified).await?;
        Ok(TrackedState::from_entity(
            &entity,
            &classified.sub_domain,
            &classified.domain,
        ))
    }

    async fn read(&self, state: &TrackedState) -> DomainResult<Option<TrackedState>> {
        let entity = match self.manager.read(&state.id, state.kind()).await {
            Ok(entity) => entity,
            Err(err) if err.is_not_found() => {
                info!("Tracked domain {} no longer exists", state.id);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        // Keep the declared split while it still spells the remote name
        let (sub_domain, domain) = match (state.get(ATTR_SUB_DOMAIN), state.get(ATTR_DOMAIN)) {
            (Some(sub_domain), Some(domain))
                if DomainName::new(entity.name.as_str())
                    .map(|n| n.is_joined_from(sub_domain, domain))
                    .unwrap_or(false) =>
            {
                (sub_domain.to_string(), domain.to_string())
            }
            _ => split_remote_name(&entity.name),
        };

        Ok(Some(TrackedState::from_entity(&entity, &sub_domain, &domain)))
    }

    async fn delete(&self, state: &TrackedState) -> DomainResult<()> {
        let name = state.name().ok_or_else(|| {
            DomainError::invalid_spec(format!("tracked domain {} has no name", state.id))
        })?;
        self.manager.delete(&state.id, state.kind(), name).await
    }
}
