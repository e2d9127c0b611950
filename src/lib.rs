// Copyright (c) 2025 - Cowboy AI, Inc.
//! Shared and private domain reconciliation for Cloud Foundry
//!
//! Reconciles a declared domain against the Cloud Foundry control plane. A
//! declaration resolves to exactly one remote kind, shared (platform wide,
//! optionally bound to a TCP router group) or private (owned by one
//! organization), and is created, read and deleted idempotently.
//!
//! ```text
//! DomainSpec ─► classify ─► LifecycleManager ─► DomainLookup / RouterGroupResolver
//!                                  │                        │
//!                                  ▼                        ▼
//!                          DomainResource ◄──────── DomainApi / RouterGroupApi /
//!                          (TrackedState)                 OrganizationApi
//! ```
//!
//! The core never talks HTTP itself; collaborators are injected as trait
//! objects. [`adapters::InMemoryControlPlane`] backs tests and the
//! `cf-api` feature provides the Cloud Controller client.

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lifecycle;
pub mod lookup;
pub mod reconcile;
pub mod router_group;
pub mod state_machine;

// Re-export commonly used types
pub use api::{DomainApi, OrganizationApi, RouterGroupApi};
pub use config::{ConfigError, ReconcilerConfig, RetryPolicy};
pub use domain::{classify, DomainEntity, DomainKind, DomainSpec, Guid, RouterType};
pub use errors::{ApiError, ApiResult, DomainError, DomainResult, RemoteError};
pub use lifecycle::LifecycleManager;
pub use reconcile::{DomainResource, Plan, ResourceHooks, TrackedState};
