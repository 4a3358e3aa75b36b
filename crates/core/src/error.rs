// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use towline_domain::{CallNumber, DomainError, LedgerKey, Status};

/// Errors returned by the status transition engine.
///
/// Both variants are reported to the caller and leave the vehicle unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The target status is not reachable from the current status.
    InvalidTransition {
        /// The current status.
        from: Status,
        /// The requested status.
        to: Status,
    },
    /// The target status requires data the record does not carry.
    MissingPrerequisiteData {
        /// The requested status.
        target: Status,
        /// The field that is missing or unusable.
        field: &'static str,
    },
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { from, to } => {
                write!(f, "Invalid transition from '{from}' to '{to}'")
            }
            Self::MissingPrerequisiteData { target, field } => {
                write!(
                    f,
                    "Cannot move to '{target}': {field} is missing or not a valid date"
                )
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// Errors surfaced by a [`crate::VehicleRepository`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// An optimistic write found the vehicle changed since it was read:
    /// another status, or another write at the same status.
    Conflict {
        call_number: CallNumber,
        /// The status the writer expected to replace.
        expected: Status,
    },
    /// No vehicle with this call number exists.
    NotFound(CallNumber),
    /// No ledger entry has this key.
    LedgerEntryNotFound(LedgerKey),
    /// A uniqueness constraint rejected the write.
    Duplicate(String),
    /// Stored data could not be interpreted.
    CorruptRecord(String),
    /// The store could not be reached or timed out.
    Unavailable(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict {
                call_number,
                expected,
            } => write!(
                f,
                "Vehicle {call_number} changed since it was read in status '{expected}'"
            ),
            Self::NotFound(call_number) => write!(f, "Vehicle {call_number} not found"),
            Self::LedgerEntryNotFound(key) => write!(f, "Ledger entry {key} not found"),
            Self::Duplicate(msg) => write!(f, "Duplicate record: {msg}"),
            Self::CorruptRecord(msg) => write!(f, "Corrupt stored record: {msg}"),
            Self::Unavailable(msg) => write!(f, "Repository unavailable: {msg}"),
        }
    }
}

impl std::error::Error for RepositoryError {}

impl From<DomainError> for RepositoryError {
    fn from(err: DomainError) -> Self {
        Self::CorruptRecord(err.to_string())
    }
}
