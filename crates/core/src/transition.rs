// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The status transition engine.
//!
//! The transition table in this module is the only place the lifecycle
//! order is encoded. Callers ask [`attempt_transition`] for a new record
//! and persist the result with an optimistic status check.

use crate::error::TransitionError;
use time::{Date, PrimitiveDateTime};
use towline_audit::{Actor, AuditEvent, Cause};
use towline_domain::{RecordedDate, Status, VehicleRecord};

/// Who is asking for a transition, when, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionContext {
    /// When the transition is applied. Stamped as `last_updated`.
    pub at: PrimitiveDateTime,
    /// The calendar date of the triggering event (document sent, vehicle
    /// released). Defaults to the date of `at`.
    pub event_date: Option<Date>,
    pub actor: Actor,
    pub cause: Cause,
    /// Free-text note recorded on the audit event and, for terminal
    /// statuses, as the outcome note.
    pub note: Option<String>,
}

impl TransitionContext {
    /// Creates a context with no explicit event date or note.
    #[must_use]
    pub const fn new(at: PrimitiveDateTime, actor: Actor, cause: Cause) -> Self {
        Self {
            at,
            event_date: None,
            actor,
            cause,
            note: None,
        }
    }

    fn effective_date(&self) -> Date {
        self.event_date.unwrap_or_else(|| self.at.date())
    }
}

/// The result of a successful state transition.
///
/// Nothing is written until the caller persists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The status the record held when it was read. Persistence conditions
    /// its write on this value.
    pub previous_status: Status,
    /// The record after the transition.
    pub record: VehicleRecord,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// Returns the statuses directly reachable from `from`.
#[must_use]
pub const fn allowed_targets(from: Status) -> &'static [Status] {
    match from {
        Status::New => &[Status::TopGenerated, Status::Released],
        Status::TopGenerated => &[Status::Tr52Ready, Status::Tr208Ready, Status::Released],
        Status::Tr52Ready | Status::Tr208Ready => &[
            Status::ReadyForAuction,
            Status::ReadyForScrap,
            Status::Released,
        ],
        Status::ReadyForAuction | Status::ReadyForScrap => &[
            Status::Released,
            Status::Auctioned,
            Status::Scrapped,
            Status::Transferred,
        ],
        Status::Released | Status::Auctioned | Status::Scrapped | Status::Transferred => &[],
    }
}

/// Returns true if `to` is directly reachable from `from`.
#[must_use]
pub fn is_transition_allowed(from: Status, to: Status) -> bool {
    allowed_targets(from).contains(&to)
}

/// Validates and applies a status change to a copy of `record`.
///
/// Side effects on the returned record:
/// - `archived` is set to match the target status.
/// - `last_updated` is stamped with `context.at`.
/// - Document statuses (`TOP Generated`, `TR52 Ready`, `TR208 Ready`) stamp
///   their sent-date field with the event date. An already recorded valid
///   date is kept unless the context names an explicit event date.
/// - Terminal statuses stamp `outcome_date` and `outcome_note`.
///
/// # Arguments
///
/// * `record` - The vehicle as last read
/// * `target` - The requested status
/// * `context` - Actor, cause, and timing of the change
///
/// # Errors
///
/// Returns `TransitionError::InvalidTransition` if `target` is not reachable
/// and `TransitionError::MissingPrerequisiteData` if the record lacks a date
/// the target status depends on.
pub fn attempt_transition(
    record: &VehicleRecord,
    target: Status,
    context: &TransitionContext,
) -> Result<TransitionResult, TransitionError> {
    if !is_transition_allowed(record.status, target) {
        return Err(TransitionError::InvalidTransition {
            from: record.status,
            to: target,
        });
    }

    check_prerequisites(record, target)?;

    let mut next: VehicleRecord = record.clone();
    let event_date: Date = context.effective_date();

    match target {
        Status::TopGenerated => {
            stamp_sent_date(&mut next.top_sent_date, event_date, context);
        }
        Status::Tr52Ready => stamp_sent_date(&mut next.tr52_sent_date, event_date, context),
        Status::Tr208Ready => stamp_sent_date(&mut next.tr208_sent_date, event_date, context),
        Status::Released | Status::Auctioned | Status::Scrapped | Status::Transferred => {
            next.outcome_date = Some(RecordedDate::Valid(event_date));
            next.outcome_note.clone_from(&context.note);
        }
        Status::New | Status::ReadyForAuction | Status::ReadyForScrap => {}
    }

    next.status = target;
    next.archived = target.archived_flag();
    next.last_updated = Some(context.at);

    let audit_event: AuditEvent = AuditEvent::for_transition(
        context.at,
        context.actor.clone(),
        context.cause.clone(),
        record,
        &next,
        context.note.clone(),
    );

    Ok(TransitionResult {
        previous_status: record.status,
        record: next,
        audit_event,
    })
}

fn stamp_sent_date(field: &mut Option<RecordedDate>, event_date: Date, context: &TransitionContext) {
    let keep_existing: bool =
        context.event_date.is_none() && matches!(field, Some(RecordedDate::Valid(_)));
    if !keep_existing {
        *field = Some(RecordedDate::Valid(event_date));
    }
}

fn check_prerequisites(record: &VehicleRecord, target: Status) -> Result<(), TransitionError> {
    let missing = |field: &'static str| TransitionError::MissingPrerequisiteData { target, field };

    match target {
        Status::Tr52Ready | Status::Tr208Ready => {
            // The redemption period must be computable before a disposition
            // form can be issued.
            match (&record.top_sent_date, &record.tow_date) {
                (Some(RecordedDate::Valid(_)), _) | (None, Some(RecordedDate::Valid(_))) => Ok(()),
                (Some(RecordedDate::Malformed(_)), _) => Err(missing("top_sent_date")),
                (None, _) => Err(missing("tow_date")),
            }
        }
        Status::ReadyForAuction | Status::ReadyForScrap => match record.status {
            Status::Tr52Ready if !is_valid(record.tr52_sent_date.as_ref()) => {
                Err(missing("tr52_sent_date"))
            }
            Status::Tr208Ready if !is_valid(record.tr208_sent_date.as_ref()) => {
                Err(missing("tr208_sent_date"))
            }
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}

const fn is_valid(date: Option<&RecordedDate>) -> bool {
    matches!(date, Some(RecordedDate::Valid(_)))
}
