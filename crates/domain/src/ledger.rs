// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification ledger records.
//!
//! The ledger is the durable, append-mostly record of every notification
//! generated. Its key is `(call_number, notification_type, due_date)`; at
//! most one entry may exist per key. The only permitted mutation is
//! `Pending -> Sent`.

use crate::deadlines::NotificationType;
use crate::error::DomainError;
use crate::vehicle::CallNumber;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, PrimitiveDateTime};

/// Whether a ledgered notification has been delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Recorded but not yet confirmed delivered.
    Pending,
    /// Delivered. Never reverts.
    Sent,
}

impl DeliveryStatus {
    /// Returns the persisted label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            _ => Err(DomainError::InvalidDeliveryStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The uniqueness key of a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    pub call_number: CallNumber,
    pub notification_type: NotificationType,
    pub due_date: Date,
}

impl LedgerKey {
    #[must_use]
    pub const fn new(
        call_number: CallNumber,
        notification_type: NotificationType,
        due_date: Date,
    ) -> Self {
        Self {
            call_number,
            notification_type,
            due_date,
        }
    }
}

impl std::fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.call_number,
            self.notification_type,
            crate::dates::format_iso_date(self.due_date)
        )
    }
}

/// A ledger entry about to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub key: LedgerKey,
    pub message: String,
    pub created_at: PrimitiveDateTime,
}

/// A stored ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub entry_id: i64,
    pub key: LedgerKey,
    pub message: String,
    pub status: DeliveryStatus,
    pub created_at: PrimitiveDateTime,
    pub sent_at: Option<PrimitiveDateTime>,
}

impl LedgerEntry {
    /// Returns true if the notification still needs delivering.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == DeliveryStatus::Pending
    }
}
