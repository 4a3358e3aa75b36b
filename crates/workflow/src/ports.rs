// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outbound collaborators the sweep drives.

use async_trait::async_trait;
use time::Date;
use towline::DocumentType;
use towline_domain::{CallNumber, LedgerEntry, NotificationType, VehicleRecord};

use crate::error::{DeliveryError, DocumentError};

/// One notification handed to the outbound channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub call_number: CallNumber,
    pub notification_type: NotificationType,
    pub due_date: Date,
    pub message: String,
}

impl From<&LedgerEntry> for Notification {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            call_number: entry.key.call_number.clone(),
            notification_type: entry.key.notification_type,
            due_date: entry.key.due_date,
            message: entry.message.clone(),
        }
    }
}

/// Delivers notifications to staff or owners.
///
/// Delivery is at-least-once from the channel's point of view: a call that
/// times out may still have been delivered, and the entry will be offered
/// again on the next sweep.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers one notification.
    ///
    /// # Errors
    ///
    /// Returns a `DeliveryError` if the channel did not accept it.
    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// A request to produce one document for a vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    pub call_number: CallNumber,
    pub document: DocumentType,
    /// The vehicle as read immediately before the request.
    pub snapshot: VehicleRecord,
}

/// Produces TOP, TR52 and TR208 documents.
#[async_trait]
pub trait DocumentTrigger: Send + Sync {
    /// Generates one document.
    ///
    /// # Errors
    ///
    /// Returns a `DocumentError` if the document was not produced.
    async fn generate(&self, request: &DocumentRequest) -> Result<(), DocumentError>;
}
