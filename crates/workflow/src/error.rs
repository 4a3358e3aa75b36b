// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;
use thiserror::Error;
use towline::{RepositoryError, TransitionError};
use towline_domain::DomainError;

/// Failure to reach or use the shared vehicle store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Timed out after {0:?} waiting for the vehicle store")]
    Timeout(Duration),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A sweep that could not run at all.
///
/// Per-vehicle failures never produce this; they are collected in the
/// `SweepReport`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SweepError {
    #[error("Vehicle store unavailable, sweep not run: {0}")]
    StoreUnavailable(StoreError),
}

/// The outbound notification channel did not accept a notification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Notification rejected: {0}")]
    Rejected(String),

    #[error("Notification channel unavailable: {0}")]
    Unavailable(String),

    #[error("Notification delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// The document collaborator did not produce the requested document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Document generation failed: {0}")]
    Failed(String),

    #[error("Document generation timed out after {0:?}")]
    Timeout(Duration),
}

/// Bulk intake could not be read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Invalid CSV format: {reason}")]
    InvalidCsvFormat { reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of a single administrative operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error(transparent)]
    InvalidInput(#[from] DomainError),

    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Vehicle {0} was changed by someone else; reload and try again")]
    Conflict(String),

    #[error("Correction contains no changes")]
    EmptyCorrection,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Repository(RepositoryError::Conflict { call_number, .. }) => {
                Self::Conflict(call_number.value().to_string())
            }
            StoreError::Repository(RepositoryError::NotFound(call_number)) => {
                Self::VehicleNotFound(call_number.value().to_string())
            }
            other => Self::Store(other),
        }
    }
}
