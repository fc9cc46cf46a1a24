//! Managed-link reference types and the orphan decision.
//!
//! Pure domain logic for deciding whether a tracked link is still backed by
//! its parent revision. All data access is done through the repository layer
//! in `stela-db`.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Surrogate id carried by a link that has not been persisted yet.
pub const UNPERSISTED_LINK_ID: DbId = -1;

/// A reference a parent revision currently contains: the target plus an
/// optional fragment/anchor qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub child_id: DbId,
    pub anchor: Option<String>,
}

impl LinkRef {
    pub fn new(child_id: DbId, anchor: Option<String>) -> Self {
        Self { child_id, anchor }
    }
}

/// Decide whether a stored link `(child_id, anchor)` is orphaned.
///
/// A link is orphaned when its parent no longer exists, or when the parent's
/// current set of references (`current_refs`, `None` when the parent is gone)
/// no longer contains the stored reference.
pub fn is_orphaned(child_id: DbId, anchor: Option<&str>, current_refs: Option<&[LinkRef]>) -> bool {
    match current_refs {
        None => true,
        Some(refs) => !refs
            .iter()
            .any(|r| r.child_id == child_id && r.anchor.as_deref() == anchor),
    }
}
