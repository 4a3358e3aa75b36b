// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A status label does not name a member of the closed status set.
    InvalidStatus {
        /// The rejected label.
        status: String,
    },
    /// A notification type label is not recognized.
    InvalidNotificationType(String),
    /// A delivery status label is not recognized.
    InvalidDeliveryStatus(String),
    /// A call number is empty or otherwise unusable.
    InvalidCallNumber(String),
    /// Failed to parse a date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse a timestamp from string.
    TimestampParseError {
        /// The invalid timestamp string.
        timestamp: String,
        /// The parsing error message.
        error: String,
    },
    /// A model year is outside the plausible range.
    InvalidModelYear(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus { status } => write!(f, "Invalid vehicle status: '{status}'"),
            Self::InvalidNotificationType(value) => {
                write!(f, "Invalid notification type: '{value}'")
            }
            Self::InvalidDeliveryStatus(value) => {
                write!(f, "Invalid delivery status: '{value}'")
            }
            Self::InvalidCallNumber(msg) => write!(f, "Invalid call number: {msg}"),
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::TimestampParseError { timestamp, error } => {
                write!(f, "Failed to parse timestamp '{timestamp}': {error}")
            }
            Self::InvalidModelYear(value) => write!(f, "Invalid model year: '{value}'"),
        }
    }
}

impl std::error::Error for DomainError {}
