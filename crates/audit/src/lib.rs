// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

//! Audit events for vehicle status changes.
//!
//! Every accepted status transition produces exactly one [`AuditEvent`].
//! Events are written in the same transaction as the status change and are
//! never modified afterwards.

use serde::Serialize;
use time::PrimitiveDateTime;
use towline_domain::{CallNumber, Status, VehicleRecord};

#[cfg(test)]
mod tests;

/// The kind of entity that initiated a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActorKind {
    /// The daily notification sweep.
    Scheduler,
    /// A staff member acting through the admin surface.
    Operator,
    /// A bulk intake run.
    Import,
}

impl ActorKind {
    /// Returns the persisted label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduler => "scheduler",
            Self::Operator => "operator",
            Self::Import => "import",
        }
    }
}

/// Represents the entity performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    pub kind: ActorKind,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `kind` - The kind of actor
    #[must_use]
    pub const fn new(id: String, kind: ActorKind) -> Self {
        Self { id, kind }
    }

    /// The actor used for every automatic change made by the sweep.
    #[must_use]
    pub fn scheduler() -> Self {
        Self::new(String::from("notification-scheduler"), ActorKind::Scheduler)
    }

    /// A named staff member.
    #[must_use]
    pub fn operator(id: &str) -> Self {
        Self::new(id.to_string(), ActorKind::Operator)
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cause {
    /// A unique identifier for this cause (sweep date, request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the status change performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    /// The name of the action (e.g., "`Transition`").
    pub name: String,
    pub from: Status,
    pub to: Status,
    /// Optional free-text note supplied with the change.
    pub details: Option<String>,
}

impl Action {
    /// Creates a status transition action.
    #[must_use]
    pub fn transition(from: Status, to: Status, details: Option<String>) -> Self {
        Self {
            name: String::from("Transition"),
            from,
            to,
            details,
        }
    }
}

/// A snapshot of one vehicle record at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// Captures the workflow-relevant fields of a record.
    #[must_use]
    pub fn of(record: &VehicleRecord) -> Self {
        Self::new(record.snapshot_line())
    }
}

/// An immutable audit event recording one status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    pub call_number: CallNumber,
    pub occurred_at: PrimitiveDateTime,
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    /// The record before the transition.
    pub before: StateSnapshot,
    /// The record after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `occurred_at` - When the transition was applied
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `before` - The record before the transition
    /// * `after` - The record after the transition
    /// * `details` - Optional free-text note
    #[must_use]
    pub fn for_transition(
        occurred_at: PrimitiveDateTime,
        actor: Actor,
        cause: Cause,
        before: &VehicleRecord,
        after: &VehicleRecord,
        details: Option<String>,
    ) -> Self {
        Self {
            call_number: after.call_number.clone(),
            occurred_at,
            actor,
            cause,
            action: Action::transition(before.status, after.status, details),
            before: StateSnapshot::of(before),
            after: StateSnapshot::of(after),
        }
    }
}
