// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Statutory deadline calculation.
//!
//! This module provides a pure, deterministic mapping from a vehicle's
//! recorded dates and current status to the deadlines that apply to it.
//! Deadlines are derived values and are never stored; the scheduler
//! recomputes them on every sweep.
//!
//! A missing or malformed source date never fails the calculation. The
//! dependent rule is skipped and a [`DataQualityIssue`] is reported.

use crate::dates::RecordedDate;
use crate::error::DomainError;
use crate::policy::{DeadlinePolicy, DispositionForm};
use crate::status::Status;
use crate::vehicle::VehicleRecord;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, Duration};

/// The kind of notification a deadline raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NotificationType {
    /// Notice to the registered owner that the vehicle was impounded.
    OwnerNotice,
    /// The redemption period has run out.
    RedemptionExpiry,
    /// A TR52/TR208 disposition form may now be issued.
    DispositionEligibility,
    /// The vehicle may now be auctioned or scrapped.
    DispositionReadiness,
}

impl NotificationType {
    /// Returns the persisted label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OwnerNotice => "owner_notice",
            Self::RedemptionExpiry => "redemption_expiry",
            Self::DispositionEligibility => "disposition_eligibility",
            Self::DispositionReadiness => "disposition_readiness",
        }
    }

    /// Returns a human-readable description for notification text.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::OwnerNotice => "owner notice",
            Self::RedemptionExpiry => "redemption period expiry",
            Self::DispositionEligibility => "disposition form eligibility",
            Self::DispositionReadiness => "auction/scrap readiness",
        }
    }
}

impl FromStr for NotificationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner_notice" => Ok(Self::OwnerNotice),
            "redemption_expiry" => Ok(Self::RedemptionExpiry),
            "disposition_eligibility" => Ok(Self::DispositionEligibility),
            "disposition_readiness" => Ok(Self::DispositionReadiness),
            _ => Err(DomainError::InvalidNotificationType(s.to_string())),
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The recorded date a deadline was counted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeadlineBasis {
    TowDate,
    TopSentDate,
    /// No TOP-sent date was recorded; the redemption start was derived from
    /// the tow date using the policy's fallback offset.
    TowDateFallback,
    Tr52SentDate,
    Tr208SentDate,
}

/// A deadline that applies to a vehicle in its current status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deadline {
    pub notification_type: NotificationType,
    pub due_date: Date,
    /// `due_date <= today`.
    pub is_due: bool,
    /// `due_date < today`.
    pub is_overdue: bool,
    pub basis: DeadlineBasis,
}

/// What was wrong with a source date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataQualityProblem {
    /// The field has no value.
    Missing,
    /// The field holds text that is not an ISO date.
    Malformed(String),
    /// Adding the statutory offset overflowed the calendar.
    DateOverflow,
}

impl std::fmt::Display for DataQualityProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Malformed(raw) => write!(f, "not an ISO date: '{raw}'"),
            Self::DateOverflow => write!(f, "date arithmetic overflow"),
        }
    }
}

/// A rule that could not be evaluated because of bad source data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQualityIssue {
    /// The rule that was skipped.
    pub rule: NotificationType,
    /// The vehicle field that blocked it.
    pub field: &'static str,
    pub problem: DataQualityProblem,
}

impl std::fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} skipped: {} {}", self.rule, self.field, self.problem)
    }
}

/// Result of evaluating one vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeadlineEvaluation {
    /// Applicable deadlines ordered by due date.
    pub deadlines: Vec<Deadline>,
    pub issues: Vec<DataQualityIssue>,
}

impl DeadlineEvaluation {
    /// Iterates the deadlines that are due on or before the evaluation date.
    pub fn due(&self) -> impl Iterator<Item = &Deadline> {
        self.deadlines.iter().filter(|deadline| deadline.is_due)
    }

    fn push(
        &mut self,
        notification_type: NotificationType,
        due_date: Date,
        basis: DeadlineBasis,
        today: Date,
    ) {
        self.deadlines.push(Deadline {
            notification_type,
            due_date,
            is_due: due_date <= today,
            is_overdue: due_date < today,
            basis,
        });
    }

    fn flag(&mut self, rule: NotificationType, field: &'static str, problem: DataQualityProblem) {
        self.issues.push(DataQualityIssue {
            rule,
            field,
            problem,
        });
    }
}

/// Computes the deadlines relevant to a vehicle's current status.
///
/// Rules:
/// - `New` without a TOP-sent date: owner notice at tow date + `owner_notice_days`.
/// - `TOP Generated`: redemption expiry at TOP-sent date + `redemption_days`,
///   starting from tow date + `redemption_fallback_offset_days` when no
///   TOP-sent date is recorded; disposition eligibility
///   `disposition_eligibility_offset_days` after expiry.
/// - `TR52 Ready` / `TR208 Ready`: readiness at form-sent date +
///   `disposition_ready_days`.
/// - Every other status has no deadlines.
///
/// All arithmetic is in calendar days on naive dates.
#[must_use]
pub fn compute_deadlines(
    record: &VehicleRecord,
    today: Date,
    policy: &DeadlinePolicy,
) -> DeadlineEvaluation {
    let mut evaluation: DeadlineEvaluation = DeadlineEvaluation::default();

    match record.status {
        Status::New => owner_notice(record, today, policy, &mut evaluation),
        Status::TopGenerated => redemption(record, today, policy, &mut evaluation),
        Status::Tr52Ready => readiness(record, DispositionForm::Tr52, today, policy, &mut evaluation),
        Status::Tr208Ready => {
            readiness(record, DispositionForm::Tr208, today, policy, &mut evaluation);
        }
        Status::ReadyForAuction
        | Status::ReadyForScrap
        | Status::Released
        | Status::Auctioned
        | Status::Scrapped
        | Status::Transferred => {}
    }

    evaluation.deadlines.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then(a.notification_type.cmp(&b.notification_type))
    });
    evaluation
}

/// Computes the date the redemption period expires, if the record carries
/// enough data to know it.
///
/// # Errors
///
/// Returns the data-quality problem that prevents the computation.
pub fn redemption_expiry(
    record: &VehicleRecord,
    policy: &DeadlinePolicy,
) -> Result<(Date, DeadlineBasis), (&'static str, DataQualityProblem)> {
    let (start, basis): (Date, DeadlineBasis) = match &record.top_sent_date {
        Some(RecordedDate::Valid(top_sent)) => (*top_sent, DeadlineBasis::TopSentDate),
        Some(RecordedDate::Malformed(raw)) => {
            return Err(("top_sent_date", DataQualityProblem::Malformed(raw.clone())));
        }
        None => {
            let tow: Date = valid_date(record.tow_date.as_ref()).map_err(|p| ("tow_date", p))?;
            let start: Date = add_days(tow, policy.redemption_fallback_offset_days)
                .ok_or(("tow_date", DataQualityProblem::DateOverflow))?;
            (start, DeadlineBasis::TowDateFallback)
        }
    };

    let field: &'static str = match basis {
        DeadlineBasis::TowDateFallback => "tow_date",
        _ => "top_sent_date",
    };
    let expiry: Date = add_days(start, policy.redemption_days)
        .ok_or((field, DataQualityProblem::DateOverflow))?;
    Ok((expiry, basis))
}

fn owner_notice(
    record: &VehicleRecord,
    today: Date,
    policy: &DeadlinePolicy,
    evaluation: &mut DeadlineEvaluation,
) {
    let rule: NotificationType = NotificationType::OwnerNotice;

    match &record.top_sent_date {
        Some(RecordedDate::Valid(_)) => return,
        Some(RecordedDate::Malformed(raw)) => {
            evaluation.flag(rule, "top_sent_date", DataQualityProblem::Malformed(raw.clone()));
            return;
        }
        None => {}
    }

    let tow: Date = match valid_date(record.tow_date.as_ref()) {
        Ok(date) => date,
        Err(problem) => {
            evaluation.flag(rule, "tow_date", problem);
            return;
        }
    };

    match add_days(tow, policy.owner_notice_days) {
        Some(due) => evaluation.push(rule, due, DeadlineBasis::TowDate, today),
        None => evaluation.flag(rule, "tow_date", DataQualityProblem::DateOverflow),
    }
}

fn redemption(
    record: &VehicleRecord,
    today: Date,
    policy: &DeadlinePolicy,
    evaluation: &mut DeadlineEvaluation,
) {
    let (expiry, basis): (Date, DeadlineBasis) = match redemption_expiry(record, policy) {
        Ok(found) => found,
        Err((field, problem)) => {
            evaluation.flag(NotificationType::RedemptionExpiry, field, problem.clone());
            evaluation.flag(NotificationType::DispositionEligibility, field, problem);
            return;
        }
    };

    evaluation.push(NotificationType::RedemptionExpiry, expiry, basis, today);

    match add_days(expiry, policy.disposition_eligibility_offset_days) {
        Some(eligible) => {
            evaluation.push(NotificationType::DispositionEligibility, eligible, basis, today);
        }
        None => evaluation.flag(
            NotificationType::DispositionEligibility,
            "top_sent_date",
            DataQualityProblem::DateOverflow,
        ),
    }
}

fn readiness(
    record: &VehicleRecord,
    form: DispositionForm,
    today: Date,
    policy: &DeadlinePolicy,
    evaluation: &mut DeadlineEvaluation,
) {
    let rule: NotificationType = NotificationType::DispositionReadiness;
    let (field, sent, basis): (&'static str, Option<&RecordedDate>, DeadlineBasis) = match form {
        DispositionForm::Tr52 => (
            "tr52_sent_date",
            record.tr52_sent_date.as_ref(),
            DeadlineBasis::Tr52SentDate,
        ),
        DispositionForm::Tr208 => (
            "tr208_sent_date",
            record.tr208_sent_date.as_ref(),
            DeadlineBasis::Tr208SentDate,
        ),
    };

    let sent: Date = match valid_date(sent) {
        Ok(date) => date,
        Err(problem) => {
            evaluation.flag(rule, field, problem);
            return;
        }
    };

    match add_days(sent, policy.disposition_ready_days) {
        Some(due) => evaluation.push(rule, due, basis, today),
        None => evaluation.flag(rule, field, DataQualityProblem::DateOverflow),
    }
}

fn valid_date(value: Option<&RecordedDate>) -> Result<Date, DataQualityProblem> {
    match value {
        Some(RecordedDate::Valid(date)) => Ok(*date),
        Some(RecordedDate::Malformed(raw)) => Err(DataQualityProblem::Malformed(raw.clone())),
        None => Err(DataQualityProblem::Missing),
    }
}

fn add_days(date: Date, days: u32) -> Option<Date> {
    date.checked_add(Duration::days(i64::from(days)))
}
