//! Managed-link models.

use serde::Serialize;
use sqlx::FromRow;
use stela_core::links::{LinkRef, UNPERSISTED_LINK_ID};
use stela_core::types::DbId;

/// A directed reference from one content revision to another resource.
///
/// Built client-side via [`ManagedLink::new`] with `id == -1`, then assigned
/// a surrogate id when first saved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ManagedLink {
    /// Surrogate id; [`UNPERSISTED_LINK_ID`] until the link is saved.
    pub id: DbId,
    pub parent_id: DbId,
    /// Revision of the parent that contained the reference when recorded.
    pub parent_revision: i64,
    pub child_id: DbId,
    /// Optional fragment/target qualifier within the child.
    pub anchor: Option<String>,
}

impl ManagedLink {
    pub fn new(parent_id: DbId, parent_revision: i64, child_id: DbId, anchor: Option<String>) -> Self {
        Self {
            id: UNPERSISTED_LINK_ID,
            parent_id,
            parent_revision,
            child_id,
            anchor,
        }
    }

    /// Whether the link has been assigned a surrogate id yet.
    pub fn is_persisted(&self) -> bool {
        self.id != UNPERSISTED_LINK_ID
    }

    /// The reference this link records, for orphan checks.
    pub fn link_ref(&self) -> LinkRef {
        LinkRef::new(self.child_id, self.anchor.clone())
    }
}
