// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for domain reconciliation
//!
//! Two layers:
//!
//! - [`ApiError`] is what the remote collaborators return. It only knows
//!   "the thing is not there" and "the call failed".
//! - [`DomainError`] is the reconciliation taxonomy. Callers branch on the
//!   variant, never on the wrapped collaborator error.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DomainKind;
use crate::state_machine::TransitionError;

/// Remote resource families addressed by the collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteResource {
    SharedDomain,
    PrivateDomain,
    RouterGroup,
    Organization,
}

impl RemoteResource {
    /// Resource family holding domains of the given kind
    pub fn domain(kind: DomainKind) -> Self {
        match kind {
            DomainKind::Shared => RemoteResource::SharedDomain,
            DomainKind::Private => RemoteResource::PrivateDomain,
        }
    }
}

impl fmt::Display for RemoteResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RemoteResource::SharedDomain => "shared domain",
            RemoteResource::PrivateDomain => "private domain",
            RemoteResource::RouterGroup => "router group",
            RemoteResource::Organization => "organization",
        };
        f.write_str(s)
    }
}

/// Failure reported by the transport collaborator
///
/// Carries whatever the control plane told us so nothing is lost on the way
/// up: HTTP status, platform error code and the human readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// HTTP status, when the failure came from a response
    pub status: Option<u16>,

    /// Platform error code (e.g. `CF-DomainNameTaken`)
    pub code: Option<String>,

    /// Description of the failure
    pub message: String,
}

impl RemoteError {
    /// Failure with only a message (connection errors and the like)
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    /// Failure decoded from an error response
    pub fn with_status(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status, &self.code) {
            (Some(status), Some(code)) => write!(f, "[{} {}] {}", status, code, self.message),
            (Some(status), None) => write!(f, "[{}] {}", status, self.message),
            (None, Some(code)) => write!(f, "[{}] {}", code, self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Errors returned by the remote collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The addressed resource does not exist
    #[error("{resource} '{key}' not found")]
    NotFound { resource: RemoteResource, key: String },

    /// Transport, authentication or server failure
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl ApiError {
    /// Flatten into a `RemoteError`, keeping a 404 as its status
    ///
    /// For calls where a missing resource is a failure rather than an
    /// absence signal.
    pub fn into_remote(self) -> RemoteError {
        match self {
            ApiError::NotFound { resource, key } => RemoteError::with_status(
                404,
                None,
                format!("{} '{}' not found", resource, key),
            ),
            ApiError::Remote(remote) => remote,
        }
    }
}

/// Result type for collaborator calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while reconciling a domain
#[derive(Debug, Error)]
pub enum DomainError {
    /// The declared specification can never be satisfied as written
    #[error("Invalid domain specification: {0}")]
    InvalidSpec(String),

    /// Nothing matched the lookup
    #[error("{resource} '{key}' not found")]
    NotFound { resource: RemoteResource, key: String },

    /// More than one remote entity matched an exact-name lookup
    #[error("{count} {resource} entries match '{key}'")]
    AmbiguousResult {
        resource: RemoteResource,
        key: String,
        count: usize,
    },

    /// The canonical name is already claimed by an incompatible domain
    #[error("Domain name '{name}' is already claimed by a {existing} domain ({guid})")]
    NameConflict {
        name: String,
        existing: DomainKind,
        guid: String,
    },

    /// The router group attached to a shared domain could not be resolved
    #[error("Router group '{router_group}' not found")]
    RouterGroupNotFound {
        router_group: String,
        #[source]
        source: Box<DomainError>,
    },

    /// Collaborator failure, cause preserved
    #[error("Remote call failed: {0}")]
    Remote(#[source] RemoteError),

    /// The delete was accepted but the name is still visible
    #[error("Delete of {kind} domain '{name}' not confirmed after {attempts} attempts")]
    DeleteNotConfirmed {
        name: String,
        kind: DomainKind,
        attempts: u32,
        last_error: Option<RemoteError>,
    },

    /// Lifecycle state machine refused a transition
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] TransitionError),
}

impl DomainError {
    /// Whether re-invoking the operation may succeed without changing the spec
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::DeleteNotConfirmed { .. })
    }

    /// Whether this is the absence signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }

    /// Build an `InvalidSpec` error
    pub fn invalid_spec(reason: impl Into<String>) -> Self {
        DomainError::InvalidSpec(reason.into())
    }
}

impl From<ApiError> for DomainError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound { resource, key } => DomainError::NotFound { resource, key },
            ApiError::Remote(remote) => DomainError::Remote(remote),
        }
    }
}

/// Result type for reconciliation operations
pub type DomainResult<T> = Result<T, DomainError>;
