// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Lifecycle State Machine
//!
//! # States
//!
//! - Absent: no remote entity (resting)
//! - Creating: create issued, entity not yet read back (transient)
//! - Present: entity exists remotely (resting)
//! - Deleting: delete issued, name still visible (transient)
//!
//! # Inputs
//!
//! - CreateRequested: Absent → Creating
//! - CreateSucceeded: Creating → Present
//! - CreateFailed: Creating → Absent
//! - Adopted: Absent → Present (compatible entity already there)
//! - DeleteRequested: Present → Deleting
//! - DeleteFailed: Deleting → Present
//! - DeleteConfirmed: Deleting → Absent
//! - DeleteUnconfirmed: Deleting → Deleting
//! - Vanished: Present → Absent (refresh found nothing)

use std::fmt;

use super::{StateMachine, TransitionError, TransitionResult};

/// Where a single reconciliation target currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainLifecycle {
    Absent,
    Creating,
    Present,
    Deleting,
}

impl fmt::Display for DomainLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Lifecycle input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    CreateRequested,
    CreateSucceeded,
    CreateFailed,
    Adopted,
    DeleteRequested,
    DeleteFailed,
    DeleteConfirmed,
    DeleteUnconfirmed,
    Vanished,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Transition output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransitionOutput {
    /// Warnings generated during transition
    pub warnings: Vec<String>,

    /// The remote side is left in an unsettled state
    pub unsettled: bool,
}

impl TransitionOutput {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            warnings: vec![message.into()],
            unsettled: false,
        }
    }

    pub fn unsettled(message: impl Into<String>) -> Self {
        Self {
            warnings: vec![message.into()],
            unsettled: true,
        }
    }
}

impl StateMachine for DomainLifecycle {
    type Input = LifecycleEvent;
    type Output = TransitionOutput;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use DomainLifecycle::*;
        use LifecycleEvent::*;

        match (self, input) {
            (Absent, CreateRequested) => Ok((Creating, TransitionOutput::ok())),
            (Absent, Adopted) => Ok((
                Present,
                TransitionOutput::warning("adopted existing remote domain"),
            )),

            (Creating, CreateSucceeded) => Ok((Present, TransitionOutput::ok())),
            (Creating, CreateFailed) => Ok((
                Absent,
                TransitionOutput::warning("remote create failed"),
            )),

            (Present, DeleteRequested) => Ok((Deleting, TransitionOutput::ok())),
            (Present, Vanished) => Ok((
                Absent,
                TransitionOutput::warning("remote domain disappeared outside reconciliation"),
            )),

            (Deleting, DeleteConfirmed) => Ok((Absent, TransitionOutput::ok())),
            (Deleting, DeleteFailed) => Ok((
                Present,
                TransitionOutput::warning("remote delete failed"),
            )),
            (Deleting, DeleteUnconfirmed) => Ok((
                Deleting,
                TransitionOutput::unsettled("delete accepted, name still visible"),
            )),

            (from, input) => Err(TransitionError::InvalidTransition {
                from: from.to_string(),
                input: input.to_string(),
            }),
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, DomainLifecycle::Absent | DomainLifecycle::Present)
    }
}
