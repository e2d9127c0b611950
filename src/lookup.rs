// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Lookup Service
//!
//! Resolves a canonical name to exactly one remote domain of a given kind.
//! `NotFound` is a first-class answer here: delete confirmation and the
//! cross-kind conflict check both branch on it.

use std::sync::Arc;

use tracing::debug;

use crate::api::DomainApi;
use crate::domain::{DomainEntity, DomainKind, Guid};
use crate::errors::{DomainError, DomainResult, RemoteResource};

/// Exact-name and by-GUID domain lookups
#[derive(Clone)]
pub struct DomainLookup {
    domains: Arc<dyn DomainApi>,
}

impl DomainLookup {
    pub fn new(domains: Arc<dyn DomainApi>) -> Self {
        Self { domains }
    }

    /// The single domain of `kind` named `name`
    ///
    /// # Errors
    /// - `NotFound` when nothing matches
    /// - `AmbiguousResult` when more than one entry matches exactly
    /// - `Remote` on collaborator failure
    pub async fn find_by_name(&self, kind: DomainKind, name: &str) -> DomainResult<DomainEntity> {
        let candidates = self.domains.list_domains(kind, name).await?;

        let mut matches: Vec<DomainEntity> = candidates
            .into_iter()
            .filter(|d| d.kind() == kind && d.name.eq_ignore_ascii_case(name))
            .collect();

        debug!(
            "Lookup of {} domain '{}' returned {} exact match(es)",
            kind,
            name,
            matches.len()
        );

        match matches.len() {
            0 => Err(DomainError::NotFound {
                resource: RemoteResource::domain(kind),
                key: name.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            count => Err(DomainError::AmbiguousResult {
                resource: RemoteResource::domain(kind),
                key: name.to_string(),
                count,
            }),
        }
    }

    /// Like [`find_by_name`](Self::find_by_name) but maps `NotFound` to `None`
    pub async fn try_find_by_name(
        &self,
        kind: DomainKind,
        name: &str,
    ) -> DomainResult<Option<DomainEntity>> {
        match self.find_by_name(kind, name).await {
            Ok(entity) => Ok(Some(entity)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Fetch by GUID within a kind
    pub async fn get(&self, kind: DomainKind, guid: &Guid) -> DomainResult<DomainEntity> {
        let entity = self.domains.get_domain(kind, guid).await?;
        if entity.kind() != kind {
            // The collaborator addressed the wrong collection; treat as absent
            return Err(DomainError::NotFound {
                resource: RemoteResource::domain(kind),
                key: guid.to_string(),
            });
        }
        Ok(entity)
    }
}
