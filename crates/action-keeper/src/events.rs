//! Notifications emitted on action state changes
//!
//! Delivery is fire-and-forget: a sink that cannot deliver logs and drops
//! the event, it never fails the operation that produced it.

use action_types::{Action, ActionId, ActionType};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionEventKind {
    Registered,
    Finalized,
    FinalizationRejected,
    Approved,
    Failed,
    Expired,
}

impl ActionEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionEventKind::Registered => "action_registered",
            ActionEventKind::Finalized => "action_finalized",
            ActionEventKind::FinalizationRejected => "action_finalization_rejected",
            ActionEventKind::Approved => "action_approved",
            ActionEventKind::Failed => "action_failed",
            ActionEventKind::Expired => "action_expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub kind: ActionEventKind,
    pub action_id: ActionId,
    pub creator: String,
    pub action_type: ActionType,
    pub attributes: BTreeMap<String, String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl ActionEvent {
    pub fn new(kind: ActionEventKind, action: &Action) -> Self {
        Self {
            kind,
            action_id: action.id.clone(),
            creator: action.creator.clone(),
            action_type: action.action_type,
            attributes: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: ActionEvent);
}

/// Forwards events into an unbounded channel
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<ActionEvent>,
}

impl ChannelEventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ActionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: ActionEvent) {
        let kind = event.kind;
        let action_id = event.action_id.clone();
        if let Err(e) = self.tx.send(event) {
            warn!(
                action_id = %action_id,
                event = kind.as_str(),
                error = %e,
                "Failed to emit action event"
            );
        } else {
            debug!(action_id = %action_id, event = kind.as_str(), "📣 Action event emitted");
        }
    }
}

/// Keeps every event in memory
#[derive(Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<ActionEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ActionEvent> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<ActionEventKind> {
        self.events.lock().iter().map(|e| e.kind).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: ActionEvent) {
        self.events.lock().push(event);
    }
}
