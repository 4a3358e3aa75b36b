// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live staff feed for notifications and document requests.
//!
//! The sweep's outbound collaborators are implemented here. Each
//! notification and document request is logged and broadcast to every
//! connected WebSocket client. A broadcast that reaches no client is a
//! failed delivery: the ledger entry stays pending and the transition waits,
//! so the next sweep offers both again.

use async_trait::async_trait;
use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use towline_domain::format_iso_date;
use towline_workflow::{
    DeliveryError, DocumentError, DocumentRequest, DocumentTrigger, Notification,
    NotificationChannel,
};

/// Maximum number of events to buffer in the broadcast channel.
/// If clients cannot keep up, older events will be dropped.
const EVENT_BUFFER_SIZE: usize = 100;

const NO_STAFF_CLIENTS: &str = "no staff clients connected";

/// Events pushed to staff clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A statutory deadline needs staff attention.
    NotificationDue {
        call_number: String,
        notification_type: String,
        due_date: String,
        message: String,
    },
    /// A document should be printed and mailed.
    DocumentRequested {
        call_number: String,
        document: String,
        vehicle: String,
    },
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
}

impl From<&Notification> for LiveEvent {
    fn from(notification: &Notification) -> Self {
        Self::NotificationDue {
            call_number: notification.call_number.to_string(),
            notification_type: notification.notification_type.as_str().to_string(),
            due_date: format_iso_date(notification.due_date),
            message: notification.message.clone(),
        }
    }
}

impl From<&DocumentRequest> for LiveEvent {
    fn from(request: &DocumentRequest) -> Self {
        Self::DocumentRequested {
            call_number: request.call_number.to_string(),
            document: request.document.as_str().to_string(),
            vehicle: request.snapshot.description.summary(),
        }
    }
}

/// Fan-out of live events to every connected staff client.
#[derive(Clone)]
pub struct LiveFeed {
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveFeed {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Broadcasts an event to all connected clients and returns how many
    /// received it. Never blocks.
    #[must_use]
    pub fn broadcast(&self, event: &LiveEvent) -> usize {
        match self.tx.send(event.clone()) {
            Ok(count) => {
                debug!(?event, receivers = count, "Broadcast live event");
                count
            }
            Err(_) => {
                debug!(?event, "No receivers for live event");
                0
            }
        }
    }

    /// Returns a receiver for all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationChannel for LiveFeed {
    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        info!(
            call_number = %notification.call_number,
            notification_type = %notification.notification_type,
            due_date = %format_iso_date(notification.due_date),
            message = %notification.message,
            "Notification"
        );
        if self.broadcast(&LiveEvent::from(notification)) == 0 {
            return Err(DeliveryError::Unavailable(String::from(NO_STAFF_CLIENTS)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentTrigger for LiveFeed {
    async fn generate(&self, request: &DocumentRequest) -> Result<(), DocumentError> {
        info!(
            call_number = %request.call_number,
            document = %request.document,
            "Document requested"
        );
        if self.broadcast(&LiveEvent::from(request)) == 0 {
            return Err(DocumentError::Failed(String::from(NO_STAFF_CLIENTS)));
        }
        Ok(())
    }
}

/// Upgrades `GET /live` to a WebSocket that streams [`LiveEvent`]s.
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    AxumState(feed): AxumState<Arc<LiveFeed>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, feed))
}

async fn handle_socket(socket: WebSocket, feed: Arc<LiveFeed>) {
    info!("Client connected to live feed");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<LiveEvent> = feed.subscribe();

    let connected_event: LiveEvent = LiveEvent::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    };

    if let Ok(json) = serde_json::to_string(&connected_event)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(?e, "Failed to serialize live event");
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live feed client fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // The feed is one-way; inbound frames are only watched for close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    warn!("Received unexpected message from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    info!("Client disconnected from live feed");
}
