//! The edit-event envelope.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use stela_core::types::{DbId, Timestamp};

/// What happened to a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    /// Content was saved in the authoring workspace.
    Saved,
    /// Content was approved for the live target.
    Published,
    /// Content was deleted.
    Deleted,
    /// Content was moved to a new location.
    Moved,
    /// A reference from this content to another resource was added.
    ReferenceAdded,
    /// A reference from this content to another resource was removed.
    ReferenceRemoved,
}

/// An upstream editing or relationship-change event.
///
/// Constructed via [`EditEvent::new`] and optionally enriched with
/// [`with_payload`](EditEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditEvent {
    pub content_id: DbId,
    pub site_id: DbId,
    pub action: EditAction,
    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,
    /// When the event was raised (UTC).
    pub timestamp: Timestamp,
}

impl EditEvent {
    pub fn new(content_id: DbId, site_id: DbId, action: EditAction) -> Self {
        Self {
            content_id,
            site_id,
            action,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}
