//! Domain errors for the three subsystems.
//!
//! Storage-layer failures always carry the original `sqlx::Error` cause.
//! None of these are retried internally — callers choose retry vs fail.

use stela_core::types::DbId;

/// Errors raised by the lock manager.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// A live lock on the object is held by a different `(session, locker)`.
    /// Surfaced to editors as "item is being edited by someone else".
    #[error("Object {object_id} is locked by {locker} (session {session})")]
    Ownership {
        object_id: DbId,
        session: String,
        locker: String,
    },

    /// The supplied object version is stale — the caller must reload.
    #[error("Stale version for object {object_id}: supplied {supplied}, lock records {current}")]
    StaleVersion {
        object_id: DbId,
        supplied: i64,
        current: i64,
    },

    /// The targeted lock row does not exist at all. A caller error, not a
    /// system fault.
    #[error("No lock exists for object {object_id}")]
    NotFound { object_id: DbId },

    #[error("Lock storage failed")]
    Storage(#[from] sqlx::Error),
}

/// Errors raised by the change ledger. Duplicate submissions are not errors
/// and never surface here — they merge silently.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Failed to save change event")]
    Save(#[source] sqlx::Error),

    #[error("Failed to load change events")]
    Load(#[source] sqlx::Error),

    #[error("Failed to delete change events")]
    Delete(#[source] sqlx::Error),
}

/// Errors raised by the managed-link registry.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("No managed link with id {link_id}")]
    NotFound { link_id: DbId },

    #[error("Failed to save managed link")]
    Save(#[source] sqlx::Error),

    #[error("Failed to load managed links")]
    Load(#[source] sqlx::Error),

    #[error("Failed to delete managed links")]
    Delete(#[source] sqlx::Error),
}
