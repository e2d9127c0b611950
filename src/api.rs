// Copyright (c) 2025 - Cowboy AI, Inc.
//! Remote collaborator interfaces
//!
//! The reconciliation core never speaks HTTP itself. It is handed typed
//! implementations of these traits at construction time and only ever calls
//! through them. Implementations own authentication, sessions and transport
//! level retries.
//!
//! ```text
//! LifecycleManager ──► DomainApi          (list / create / get / delete)
//!                  ├─► RouterGroupApi     (list / get)
//!                  └─► OrganizationApi    (get, validation only)
//! ```
//!
//! Contract for every implementation:
//! - A missing addressed resource is [`ApiError::NotFound`](crate::errors::ApiError::NotFound)
//! - Anything else that goes wrong is [`ApiError::Remote`](crate::errors::ApiError::Remote)
//! - Implementations are `Send + Sync` and may be shared across tasks

use async_trait::async_trait;

use crate::domain::{DomainEntity, DomainKind, Guid, NewDomain, Organization, RouterGroup};
use crate::errors::ApiResult;

/// Remote domain API
#[async_trait]
pub trait DomainApi: Send + Sync {
    /// Domains of `kind` whose name matches `name`
    ///
    /// The remote filter may be looser than an exact match; callers filter
    /// again.
    async fn list_domains(&self, kind: DomainKind, name: &str) -> ApiResult<Vec<DomainEntity>>;

    /// Create a domain and return the created entity
    async fn create_domain(&self, request: &NewDomain) -> ApiResult<DomainEntity>;

    /// Fetch one domain by GUID
    async fn get_domain(&self, kind: DomainKind, guid: &Guid) -> ApiResult<DomainEntity>;

    /// Delete one domain by GUID
    async fn delete_domain(&self, kind: DomainKind, guid: &Guid) -> ApiResult<()>;
}

/// Remote router-group API
#[async_trait]
pub trait RouterGroupApi: Send + Sync {
    /// Router groups, optionally filtered by name
    async fn list_router_groups(&self, name: Option<&str>) -> ApiResult<Vec<RouterGroup>>;

    /// Fetch one router group by GUID
    async fn get_router_group(&self, guid: &Guid) -> ApiResult<RouterGroup>;
}

/// Remote organization API
#[async_trait]
pub trait OrganizationApi: Send + Sync {
    /// Fetch one organization by GUID
    async fn get_organization(&self, guid: &Guid) -> ApiResult<Organization>;
}
