//! Edit-lock models.

use serde::Serialize;
use sqlx::FromRow;
use stela_core::locking::LockOwner;
use stela_core::types::{DbId, Timestamp, UnixMillis};

/// A row from the `edit_locks` table.
///
/// At most one row exists per `object_id`. A row whose `expires_at` has
/// passed is logically absent — readers treat it as unlocked and the next
/// successful acquire overwrites it in place.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EditLock {
    pub object_id: DbId,
    pub session: String,
    pub locker: String,
    /// Version of the locked object as observed by the holder, not a version
    /// of the lock row itself.
    pub version: i64,
    /// Expiry deadline, unix epoch milliseconds.
    pub expires_at: UnixMillis,
    pub created_at: Timestamp,
}

impl EditLock {
    /// Whether the lock is still live at `now`.
    pub fn is_live(&self, now: UnixMillis) -> bool {
        self.expires_at > now
    }

    /// The `(session, locker)` pair holding this lock.
    pub fn owner(&self) -> LockOwner {
        LockOwner::new(self.session.clone(), self.locker.clone())
    }
}

/// Input for acquiring a lock.
#[derive(Debug, Clone)]
pub struct CreateLock {
    pub object_id: DbId,
    pub owner: LockOwner,
    /// Object version the caller last observed.
    pub version: i64,
    /// Requested time-to-live in milliseconds; clamped to the allowed range.
    pub ttl_ms: i64,
}
