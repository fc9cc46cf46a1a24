//! Edit-lock ownership and TTL rules.
//!
//! This module lives in `core` (zero internal deps) so that the repository
//! layer and any future worker tooling reference the same lock durations and
//! owner identity rules.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TTL constants
// ---------------------------------------------------------------------------

/// Default lock time-to-live in milliseconds (30 minutes).
pub const DEFAULT_LOCK_TTL_MS: i64 = 30 * 60 * 1000;

/// Maximum allowed lock TTL in milliseconds (4 hours).
pub const MAX_LOCK_TTL_MS: i64 = 4 * 60 * 60 * 1000;

/// Minimum lock TTL in milliseconds.
pub const MIN_LOCK_TTL_MS: i64 = 1;

/// Clamp a requested TTL into the allowed range.
pub fn clamp_ttl(ttl_ms: i64) -> i64 {
    ttl_ms.clamp(MIN_LOCK_TTL_MS, MAX_LOCK_TTL_MS)
}

// ---------------------------------------------------------------------------
// LockOwner
// ---------------------------------------------------------------------------

/// The identity a lock is held under: an editing session plus the user
/// driving it. Two locks are "the same owner" only when both parts match —
/// the same user editing from a second session is a different owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOwner {
    /// Opaque editing-session identifier.
    pub session: String,
    /// User identity.
    pub locker: String,
}

impl LockOwner {
    pub fn new(session: impl Into<String>, locker: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            locker: locker.into(),
        }
    }

    /// Mint an owner with a fresh v4 session id for the given user.
    pub fn new_session(locker: impl Into<String>) -> Self {
        Self {
            session: Uuid::new_v4().to_string(),
            locker: locker.into(),
        }
    }

    /// Whether this owner matches the stored `(session, locker)` pair.
    pub fn matches(&self, session: &str, locker: &str) -> bool {
        self.session == session && self.locker == locker
    }
}
