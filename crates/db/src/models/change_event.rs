//! Change-ledger models.

use serde::Serialize;
use sqlx::FromRow;
use stela_core::publishing::ChangeType;
use stela_core::types::{DbId, Timestamp};

/// A row from the `change_events` table.
///
/// The composite `(content_id, site_id, change_type)` key is the whole fact;
/// there is no surrogate id, which is what makes duplicate submission a
/// no-op merge rather than an error.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChangeEvent {
    pub content_id: DbId,
    pub site_id: DbId,
    /// Stored change-type code; see [`ChangeEvent::change_type`].
    pub change_type: String,
    pub recorded_at: Timestamp,
}

impl ChangeEvent {
    /// Decode the stored code, `None` for codes this build does not know.
    pub fn change_type(&self) -> Option<ChangeType> {
        ChangeType::from_code(&self.change_type)
    }
}
