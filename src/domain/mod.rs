// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Models
//!
//! Value objects and entities shared by every reconciliation component.
//!
//! - [`DomainSpec`] - declared desired state
//! - [`classify`] - pure kind/name decision for a spec
//! - [`DomainName`] - DNS-validated canonical name
//! - [`DomainEntity`] - remote domain, kind as a tagged [`DomainScope`]
//! - [`RouterGroup`] - remote router group (read-only)

pub mod entity;
pub mod name;
pub mod spec;

pub use entity::{
    DomainEntity, DomainKind, DomainScope, Guid, NewDomain, Organization, RouterBinding,
    RouterGroup, RouterType,
};
pub use name::{DomainName, DomainNameError};
pub use spec::{classify, ClassifiedDomain, DomainSpec};
