// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::result::DatabaseErrorKind;
use towline::RepositoryError;
use towline_domain::{CallNumber, LedgerKey, Status};

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A UNIQUE constraint rejected an insert.
    UniqueViolation(String),
    /// A conditional write found a different status than expected.
    StatusConflict {
        call_number: CallNumber,
        expected: Status,
    },
    /// The vehicle does not exist.
    VehicleNotFound(CallNumber),
    /// The ledger entry does not exist.
    LedgerEntryNotFound(LedgerKey),
    /// A stored row could not be converted to a domain value.
    CorruptRow(String),
    /// Serialization/deserialization error.
    SerializationError(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::UniqueViolation(msg) => write!(f, "Unique constraint violated: {msg}"),
            Self::StatusConflict {
                call_number,
                expected,
            } => write!(
                f,
                "Vehicle {call_number} changed since it was read (expected status '{expected}')"
            ),
            Self::VehicleNotFound(call_number) => write!(f, "Vehicle not found: {call_number}"),
            Self::LedgerEntryNotFound(key) => write!(f, "Ledger entry not found: {key}"),
            Self::CorruptRow(msg) => write!(f, "Corrupt row: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation(info.message().to_string())
            }
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<PersistenceError> for RepositoryError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::StatusConflict {
                call_number,
                expected,
            } => Self::Conflict {
                call_number,
                expected,
            },
            PersistenceError::VehicleNotFound(call_number) => Self::NotFound(call_number),
            PersistenceError::LedgerEntryNotFound(key) => Self::LedgerEntryNotFound(key),
            PersistenceError::UniqueViolation(msg) => Self::Duplicate(msg),
            PersistenceError::CorruptRow(msg) | PersistenceError::SerializationError(msg) => {
                Self::CorruptRecord(msg)
            }
            other => Self::Unavailable(other.to_string()),
        }
    }
}
