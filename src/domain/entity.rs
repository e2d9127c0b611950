// Copyright (c) 2025 - Cowboy AI, Inc.
//! Remote entities as seen by the reconciliation core
//!
//! A domain is exactly one of two kinds. The kind-specific fields live inside
//! [`DomainScope`] so a private domain can never carry a router group and a
//! shared domain can never carry an owning organization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque, stable remote identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    pub fn new(guid: impl Into<String>) -> Self {
        Self(guid.into())
    }

    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier has the shape the platform uses for GUIDs
    pub fn looks_like_uuid(value: &str) -> bool {
        Uuid::parse_str(value).is_ok()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Guid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Guid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Domain kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainKind {
    /// Usable by every organization on the platform
    Shared,
    /// Scoped to one organization
    Private,
}

impl DomainKind {
    /// The other kind; names are unique across both
    pub fn opposite(self) -> Self {
        match self {
            DomainKind::Shared => DomainKind::Private,
            DomainKind::Private => DomainKind::Shared,
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainKind::Shared => f.write_str("shared"),
            DomainKind::Private => f.write_str("private"),
        }
    }
}

/// Routing protocol served by a router group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterType {
    Http,
    Tcp,
}

impl RouterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouterType::Http => "http",
            RouterType::Tcp => "tcp",
        }
    }
}

impl fmt::Display for RouterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(RouterType::Http),
            "tcp" => Ok(RouterType::Tcp),
            other => Err(format!("unknown router type '{}'", other)),
        }
    }
}

/// Named pool of routing infrastructure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterGroup {
    pub guid: Guid,
    pub name: String,
    #[serde(rename = "type")]
    pub router_type: RouterType,
}

/// Router group a shared domain is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterBinding {
    pub router_group_guid: Guid,
    pub router_type: RouterType,
}

/// Kind-specific part of a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DomainScope {
    Shared { router: Option<RouterBinding> },
    Private { owning_organization_guid: Guid },
}

/// Authoritative remote domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEntity {
    pub guid: Guid,
    pub name: String,
    pub scope: DomainScope,
}

impl DomainEntity {
    pub fn kind(&self) -> DomainKind {
        match self.scope {
            DomainScope::Shared { .. } => DomainKind::Shared,
            DomainScope::Private { .. } => DomainKind::Private,
        }
    }

    pub fn router_group_guid(&self) -> Option<&Guid> {
        match &self.scope {
            DomainScope::Shared { router } => router.as_ref().map(|r| &r.router_group_guid),
            DomainScope::Private { .. } => None,
        }
    }

    pub fn router_type(&self) -> Option<RouterType> {
        match &self.scope {
            DomainScope::Shared { router } => router.as_ref().map(|r| r.router_type),
            DomainScope::Private { .. } => None,
        }
    }

    pub fn owning_organization_guid(&self) -> Option<&Guid> {
        match &self.scope {
            DomainScope::Shared { .. } => None,
            DomainScope::Private {
                owning_organization_guid,
            } => Some(owning_organization_guid),
        }
    }
}

/// Create request handed to the domain collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NewDomain {
    Shared {
        name: String,
        router_group_guid: Option<Guid>,
    },
    Private {
        name: String,
        organization_guid: Guid,
    },
}

impl NewDomain {
    pub fn name(&self) -> &str {
        match self {
            NewDomain::Shared { name, .. } | NewDomain::Private { name, .. } => name,
        }
    }

    pub fn kind(&self) -> DomainKind {
        match self {
            NewDomain::Shared { .. } => DomainKind::Shared,
            NewDomain::Private { .. } => DomainKind::Private,
        }
    }
}

/// Organization, only ever read for validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub guid: Guid,
    pub name: String,
}
