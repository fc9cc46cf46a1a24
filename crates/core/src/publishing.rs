//! Publish-relevant change classification.
//!
//! A change event marks a piece of content as pending for a publish target.
//! The `(content, site, change type)` triple is the whole fact — recording
//! the same triple twice merges into one stored row.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Sentinel site id meaning "ignore the site filter" in bulk deletes.
pub const SITE_WILDCARD: DbId = -1;

/// The kind of publish action a recorded change implies.
///
/// Stored as its stable string code (see [`ChangeType::code`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Content must go to the live target on the next publish run.
    PendingLive,
    /// Content must go to the staging target on the next publish run.
    PendingStaged,
    /// Content was removed and must be unpublished.
    PendingRemove,
}

impl ChangeType {
    /// All change types, in storage-code order.
    pub const ALL: &'static [ChangeType] = &[
        ChangeType::PendingLive,
        ChangeType::PendingStaged,
        ChangeType::PendingRemove,
    ];

    /// Stable code used as the stored `change_type` column value.
    pub fn code(self) -> &'static str {
        match self {
            ChangeType::PendingLive => "pending_live",
            ChangeType::PendingStaged => "pending_staged",
            ChangeType::PendingRemove => "pending_remove",
        }
    }

    /// Parse a stored code back into a change type.
    pub fn from_code(code: &str) -> Option<ChangeType> {
        ChangeType::ALL.iter().copied().find(|ct| ct.code() == code)
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
