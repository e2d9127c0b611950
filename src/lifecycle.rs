// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Lifecycle Manager
//!
//! Orchestrates create, read and delete for a single domain. The manager is
//! the only component that decides which remote call to issue; it never
//! mutates entity fields itself.
//!
//! # Create
//!
//! ```text
//! classify ──► opposite kind taken? ──► resolve router group / validate org
//!                    │ yes                        │
//!                    ▼                            ▼
//!              NameConflict          same kind present? ── compatible ──► adopt
//!                                                 │ no           │ not
//!                                                 ▼              ▼
//!                                        create ──► read   NameConflict
//! ```
//!
//! # Delete
//!
//! The remote delete is accepted synchronously but the name can stay
//! visible to list queries for a while. After the delete call the manager
//! polls the name with a bounded, backoff-spaced budget. Dropping the future
//! only abandons the wait; the delete already issued stays in effect.
//!
//! Every step is checked against [`DomainLifecycle`] and recorded with a
//! timestamp, so a refused transition surfaces as `DomainError::Lifecycle`
//! instead of a silently wrong remote call.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::{DomainApi, OrganizationApi, RouterGroupApi};
use crate::config::ReconcilerConfig;
use crate::domain::{
    classify, ClassifiedDomain, DomainEntity, DomainKind, DomainSpec, Guid, NewDomain,
};
use crate::errors::{ApiError, DomainError, DomainResult, RemoteError};
use crate::lookup::DomainLookup;
use crate::router_group::RouterGroupResolver;
use crate::state_machine::{
    DomainLifecycle, LifecycleEvent, StateMachine, StateMachineWithHistory,
};

/// Per-call lifecycle tracker
///
/// Lives for the duration of one operation. Nothing is persisted: the next
/// call starts again from what a fresh remote lookup says.
struct LifecycleTracker {
    name: String,
    fsm: StateMachineWithHistory<DomainLifecycle>,
}

impl LifecycleTracker {
    fn new(name: &str, initial: DomainLifecycle) -> Self {
        Self {
            name: name.to_string(),
            fsm: StateMachineWithHistory::new(initial),
        }
    }

    fn step(&mut self, event: LifecycleEvent) -> DomainResult<()> {
        let from = *self.fsm.current_state();
        let output = self.fsm.transition_with_history(event, Utc::now())?;
        debug!(
            "Domain '{}': {} --{}--> {}",
            self.name,
            from,
            event,
            self.fsm.current_state()
        );
        for warning in &output.warnings {
            if output.unsettled {
                debug!("Domain '{}': {}", self.name, warning);
            } else {
                warn!("Domain '{}': {}", self.name, warning);
            }
        }
        Ok(())
    }

    fn finish(&self) {
        let state = self.fsm.current_state();
        debug!(
            "Domain '{}' settled in {} after {} transition(s) (terminal: {})",
            self.name,
            state,
            self.fsm.history().len(),
            state.is_terminal()
        );
    }
}

/// Create / read / delete orchestration for shared and private domains
#[derive(Clone)]
pub struct LifecycleManager {
    domains: Arc<dyn DomainApi>,
    organizations: Arc<dyn OrganizationApi>,
    lookup: DomainLookup,
    resolver: RouterGroupResolver,
    config: ReconcilerConfig,
}

impl LifecycleManager {
    pub fn new(
        domains: Arc<dyn DomainApi>,
        router_groups: Arc<dyn RouterGroupApi>,
        organizations: Arc<dyn OrganizationApi>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            lookup: DomainLookup::new(domains.clone()),
            resolver: RouterGroupResolver::new(router_groups),
            domains,
            organizations,
            config,
        }
    }

    /// Build from one object serving all three collaborator roles
    pub fn from_control_plane<P>(plane: Arc<P>, config: ReconcilerConfig) -> Self
    where
        P: DomainApi + RouterGroupApi + OrganizationApi + 'static,
    {
        Self::new(plane.clone(), plane.clone(), plane, config)
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn resolver(&self) -> &RouterGroupResolver {
        &self.resolver
    }

    /// Create (or adopt) the domain described by `spec`
    ///
    /// # Errors
    /// - `InvalidSpec` for a malformed spec or an unknown organization
    /// - `NameConflict` when the name is held by the other kind, or by an
    ///   incompatible domain of the same kind; no create is issued
    /// - `RouterGroupNotFound` when the router group cannot be resolved
    /// - `AmbiguousResult` / `Remote` from the underlying lookups and calls
    pub async fn create(&self, spec: &DomainSpec) -> DomainResult<DomainEntity> {
        let classified = classify(spec)?;
        self.create_classified(spec, &classified).await
    }

    /// Same as [`create`](Self::create) for an already classified spec
    pub async fn create_classified(
        &self,
        spec: &DomainSpec,
        classified: &ClassifiedDomain,
    ) -> DomainResult<DomainEntity> {
        let name = classified.name.as_str();
        let kind = classified.kind;
        info!("Reconciling {} domain '{}'", kind, name);

        // Names are unique across kinds
        if let Some(existing) = self.lookup.try_find_by_name(kind.opposite(), name).await? {
            warn!(
                "Domain '{}' already exists as a {} domain ({})",
                name,
                existing.kind(),
                existing.guid
            );
            return Err(DomainError::NameConflict {
                name: name.to_string(),
                existing: existing.kind(),
                guid: existing.guid.to_string(),
            });
        }

        let request = self.build_request(spec, classified).await?;

        let mut tracker = LifecycleTracker::new(name, DomainLifecycle::Absent);

        if let Some(existing) = self.lookup.try_find_by_name(kind, name).await? {
            if !is_compatible(&existing, &request) {
                warn!(
                    "Domain '{}' exists ({}) with different settings, refusing to adopt",
                    name, existing.guid
                );
                return Err(DomainError::NameConflict {
                    name: name.to_string(),
                    existing: existing.kind(),
                    guid: existing.guid.to_string(),
                });
            }
            tracker.step(LifecycleEvent::Adopted)?;
            info!("Adopted existing {} domain '{}' ({})", kind, name, existing.guid);
            tracker.finish();
            return Ok(existing);
        }

        tracker.step(LifecycleEvent::CreateRequested)?;
        let created = match self.domains.create_domain(&request).await {
            Ok(created) => created,
            Err(err) => {
                tracker.step(LifecycleEvent::CreateFailed)?;
                warn!("Create of {} domain '{}' failed: {}", kind, name, err);
                // A 404 on create is a failed call, not an absence
                return Err(DomainError::Remote(err.into_remote()));
            }
        };
        tracker.step(LifecycleEvent::CreateSucceeded)?;
        info!("Created {} domain '{}' ({})", kind, name, created.guid);

        // Read-after-write so the caller sees authoritative remote state
        let fetched = self
            .lookup
            .get(kind, &created.guid)
            .await
            .map_err(|err| match err {
                DomainError::NotFound { resource, key } => {
                    warn!("Created domain '{}' ({}) not readable", name, created.guid);
                    DomainError::Remote(ApiError::NotFound { resource, key }.into_remote())
                }
                other => other,
            })?;
        tracker.finish();
        Ok(fetched)
    }

    async fn build_request(
        &self,
        spec: &DomainSpec,
        classified: &ClassifiedDomain,
    ) -> DomainResult<NewDomain> {
        let name = classified.name.as_str().to_string();

        match classified.kind {
            DomainKind::Shared => {
                let router_group_guid = match spec.router_group() {
                    None => None,
                    Some(router_group) => {
                        let group = self.resolver.resolve(router_group).await.map_err(|err| {
                            if err.is_not_found() {
                                DomainError::RouterGroupNotFound {
                                    router_group: router_group.to_string(),
                                    source: Box::new(err),
                                }
                            } else {
                                err
                            }
                        })?;
                        Some(group.guid)
                    }
                };
                Ok(NewDomain::Shared {
                    name,
                    router_group_guid,
                })
            }
            DomainKind::Private => {
                let org = spec
                    .org()
                    .ok_or_else(|| DomainError::invalid_spec("private domain without 'org'"))?;
                let organization_guid = Guid::new(org);
                match self.organizations.get_organization(&organization_guid).await {
                    Ok(organization) => {
                        debug!(
                            "Validated organization '{}' ({})",
                            organization.name, organization.guid
                        );
                    }
                    Err(ApiError::NotFound { .. }) => {
                        return Err(DomainError::invalid_spec(format!(
                            "organization '{}' does not exist",
                            org
                        )));
                    }
                    Err(err) => return Err(err.into()),
                }
                Ok(NewDomain::Private {
                    name,
                    organization_guid,
                })
            }
        }
    }

    /// Fetch the authoritative entity
    ///
    /// # Errors
    /// - `NotFound` when no domain of `kind` has this GUID
    pub async fn read(&self, guid: &Guid, kind: DomainKind) -> DomainResult<DomainEntity> {
        debug!("Reading {} domain {}", kind, guid);
        match self.lookup.get(kind, guid).await {
            Err(err) if err.is_not_found() => {
                let mut tracker = LifecycleTracker::new(guid.as_str(), DomainLifecycle::Present);
                tracker.step(LifecycleEvent::Vanished)?;
                tracker.finish();
                Err(err)
            }
            result => result,
        }
    }

    /// Find a domain by GUID without knowing its kind (shared first)
    pub async fn find_by_guid(&self, guid: &Guid) -> DomainResult<DomainEntity> {
        match self.lookup.get(DomainKind::Shared, guid).await {
            Ok(entity) => Ok(entity),
            Err(err) if err.is_not_found() => self.lookup.get(DomainKind::Private, guid).await,
            Err(err) => Err(err),
        }
    }

    /// Delete a domain and wait until its name is no longer visible
    ///
    /// A domain that is already gone is not an error: the poll confirms
    /// absence straight away.
    ///
    /// # Errors
    /// - `Remote` when the delete call itself fails
    /// - `DeleteNotConfirmed` (retryable) when the name is still visible
    ///   after the attempt budget
    pub async fn delete(&self, guid: &Guid, kind: DomainKind, name: &str) -> DomainResult<()> {
        let mut tracker = LifecycleTracker::new(name, DomainLifecycle::Present);
        tracker.step(LifecycleEvent::DeleteRequested)?;

        info!("Deleting {} domain '{}' ({})", kind, name, guid);
        match self.domains.delete_domain(kind, guid).await {
            Ok(()) => {}
            Err(ApiError::NotFound { .. }) => {
                debug!("Domain {} already gone before delete", guid);
            }
            Err(ApiError::Remote(err)) => {
                tracker.step(LifecycleEvent::DeleteFailed)?;
                warn!("Delete of {} domain '{}' failed: {}", kind, name, err);
                return Err(DomainError::Remote(err));
            }
        }

        self.confirm_absent(&mut tracker, guid, kind, name).await?;
        tracker.finish();
        Ok(())
    }

    async fn confirm_absent(
        &self,
        tracker: &mut LifecycleTracker,
        guid: &Guid,
        kind: DomainKind,
        name: &str,
    ) -> DomainResult<()> {
        let policy = &self.config.delete_confirmation;
        let attempts = policy.max_attempts.max(1);
        let mut last_error: Option<RemoteError> = None;

        for attempt in 1..=attempts {
            match self.lookup.find_by_name(kind, name).await {
                Err(err) if err.is_not_found() => {
                    tracker.step(LifecycleEvent::DeleteConfirmed)?;
                    info!("Delete of '{}' confirmed after {} lookup(s)", name, attempt);
                    return Ok(());
                }
                Ok(found) if &found.guid != guid => {
                    // Name already reused by another entity; ours is gone
                    tracker.step(LifecycleEvent::DeleteConfirmed)?;
                    info!(
                        "Name '{}' now held by {}, delete of {} confirmed",
                        name, found.guid, guid
                    );
                    return Ok(());
                }
                Ok(_) | Err(DomainError::AmbiguousResult { .. }) => {
                    debug!(
                        "Domain '{}' still visible (attempt {}/{})",
                        name, attempt, attempts
                    );
                }
                Err(DomainError::Remote(err)) => {
                    warn!(
                        "Lookup during delete confirmation of '{}' failed (attempt {}/{}): {}",
                        name, attempt, attempts, err
                    );
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }

            tracker.step(LifecycleEvent::DeleteUnconfirmed)?;
            if attempt < attempts {
                tokio::time::sleep(policy.delay_after(attempt)).await;
            }
        }

        warn!(
            "Delete of {} domain '{}' not confirmed after {} attempt(s)",
            kind, name, attempts
        );
        Err(DomainError::DeleteNotConfirmed {
            name: name.to_string(),
            kind,
            attempts,
            last_error,
        })
    }
}

/// Whether an existing same-kind entity already satisfies the request
fn is_compatible(existing: &DomainEntity, request: &NewDomain) -> bool {
    match request {
        NewDomain::Shared {
            router_group_guid, ..
        } => {
            existing.kind() == DomainKind::Shared
                && existing.router_group_guid() == router_group_guid.as_ref()
        }
        NewDomain::Private {
            organization_guid, ..
        } => existing.owning_organization_guid() == Some(organization_guid),
    }
}
