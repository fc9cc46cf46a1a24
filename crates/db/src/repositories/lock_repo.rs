//! Repository for the `edit_locks` table.
//!
//! Exclusive, time-bounded edit locks keyed by object id. Expiry is lazy: a
//! row past its deadline reads as unlocked and is overwritten in place by
//! the next successful acquire — no background sweeper is required for
//! correctness (but see [`LockRepo::cleanup_expired`]).

use stela_core::locking::{clamp_ttl, LockOwner};
use stela_core::types::{now_ms, DbId};

use crate::error::LockError;
use crate::models::lock::{CreateLock, EditLock};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "object_id, session, locker, version, expires_at, created_at";

/// Provides acquire/extend/release operations for edit locks.
pub struct LockRepo;

impl LockRepo {
    /// Acquire the lock for an object, or re-acquire it idempotently.
    ///
    /// The decision is a single conditional upsert: the existing row is
    /// overwritten only when it is expired (with a version at or below the
    /// supplied one) or held by the same owner at the same version. When the
    /// store rejects the write, a follow-up read names the reason:
    ///
    /// - live row under a different owner → [`LockError::Ownership`]
    /// - otherwise the version guard failed → [`LockError::StaleVersion`]
    ///
    /// If the follow-up read finds the row gone, the holder released it
    /// between the two statements and the acquire is attempted again.
    pub async fn create(pool: &DbPool, input: &CreateLock) -> Result<EditLock, LockError> {
        let query = format!(
            "INSERT INTO edit_locks (object_id, session, locker, version, expires_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(object_id) DO UPDATE SET \
                 session = excluded.session, \
                 locker = excluded.locker, \
                 version = excluded.version, \
                 expires_at = excluded.expires_at \
             WHERE (edit_locks.session = excluded.session \
                    AND edit_locks.locker = excluded.locker \
                    AND edit_locks.version = excluded.version) \
                OR (edit_locks.expires_at <= ?6 \
                    AND edit_locks.version <= excluded.version) \
             RETURNING {COLUMNS}"
        );

        loop {
            let now = now_ms();
            let expires_at = now + clamp_ttl(input.ttl_ms);

            let acquired = sqlx::query_as::<_, EditLock>(&query)
                .bind(input.object_id)
                .bind(&input.owner.session)
                .bind(&input.owner.locker)
                .bind(input.version)
                .bind(expires_at)
                .bind(now)
                .fetch_optional(pool)
                .await?;

            if let Some(lock) = acquired {
                return Ok(lock);
            }

            // The conditional write was rejected; read the row to classify.
            match Self::find_by_object_id(pool, input.object_id).await? {
                None => continue,
                Some(row) => {
                    if row.is_live(now) && !input.owner.matches(&row.session, &row.locker) {
                        return Err(LockError::Ownership {
                            object_id: input.object_id,
                            session: row.session,
                            locker: row.locker,
                        });
                    }
                    return Err(LockError::StaleVersion {
                        object_id: input.object_id,
                        supplied: input.version,
                        current: row.version,
                    });
                }
            }
        }
    }

    /// Advance the expiry deadline of a lock held by `owner`.
    ///
    /// A single filtered update; misses are classified as [`LockError::NotFound`]
    /// (no row at all), [`LockError::Ownership`] (held by another owner), or
    /// [`LockError::StaleVersion`]. The same owner may extend its own row even
    /// past expiry — `NotFound` is reserved for a row that no longer exists.
    pub async fn extend(
        pool: &DbPool,
        object_id: DbId,
        owner: &LockOwner,
        version: i64,
        ttl_ms: i64,
    ) -> Result<EditLock, LockError> {
        let expires_at = now_ms() + clamp_ttl(ttl_ms);
        let query = format!(
            "UPDATE edit_locks SET expires_at = ?5 \
             WHERE object_id = ?1 AND session = ?2 AND locker = ?3 AND version = ?4 \
             RETURNING {COLUMNS}"
        );

        let extended = sqlx::query_as::<_, EditLock>(&query)
            .bind(object_id)
            .bind(&owner.session)
            .bind(&owner.locker)
            .bind(version)
            .bind(expires_at)
            .fetch_optional(pool)
            .await?;

        match extended {
            Some(lock) => Ok(lock),
            None => match Self::find_by_object_id(pool, object_id).await? {
                None => Err(LockError::NotFound { object_id }),
                Some(row) if !owner.matches(&row.session, &row.locker) => {
                    Err(LockError::Ownership {
                        object_id,
                        session: row.session,
                        locker: row.locker,
                    })
                }
                Some(row) => Err(LockError::StaleVersion {
                    object_id,
                    supplied: version,
                    current: row.version,
                }),
            },
        }
    }

    /// Whether a *different* owner currently holds a live lock on the object.
    ///
    /// Snapshot read: a caller that checks and then acquires may still lose
    /// the race and see [`LockError::Ownership`] — that is expected and is
    /// handled by retry at the call site.
    pub async fn is_locked_for(
        pool: &DbPool,
        object_id: DbId,
        owner: &LockOwner,
    ) -> Result<bool, LockError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM edit_locks \
             WHERE object_id = ?1 AND expires_at > ?2 \
               AND NOT (session = ?3 AND locker = ?4)",
        )
        .bind(object_id)
        .bind(now_ms())
        .bind(&owner.session)
        .bind(&owner.locker)
        .fetch_one(pool)
        .await?;
        Ok(count.0 > 0)
    }

    /// Live locks for the given object ids, optionally filtered to one owner.
    pub async fn find_by_object_ids(
        pool: &DbPool,
        object_ids: &[DbId],
        owner: Option<&LockOwner>,
    ) -> Result<Vec<EditLock>, LockError> {
        if object_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; object_ids.len()].join(", ");
        let mut query = format!(
            "SELECT {COLUMNS} FROM edit_locks \
             WHERE object_id IN ({placeholders}) AND expires_at > ?"
        );
        if owner.is_some() {
            query.push_str(" AND session = ? AND locker = ?");
        }
        query.push_str(" ORDER BY object_id");

        let mut q = sqlx::query_as::<_, EditLock>(&query);
        for id in object_ids {
            q = q.bind(id);
        }
        q = q.bind(now_ms());
        if let Some(owner) = owner {
            q = q.bind(&owner.session).bind(&owner.locker);
        }
        Ok(q.fetch_all(pool).await?)
    }

    /// Release the given locks. Idempotent: releasing an already-released or
    /// already-expired lock is not an error. Returns the rows deleted.
    pub async fn release(pool: &DbPool, locks: &[EditLock]) -> Result<u64, LockError> {
        if locks.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; locks.len()].join(", ");
        let query = format!("DELETE FROM edit_locks WHERE object_id IN ({placeholders})");
        let mut q = sqlx::query(&query);
        for lock in locks {
            q = q.bind(lock.object_id);
        }
        Ok(q.execute(pool).await?.rows_affected())
    }

    /// Delete expired rows. Purely optional housekeeping for bounded row
    /// growth — lazy expiry alone is sufficient for correctness. Returns the
    /// number of rows removed.
    pub async fn cleanup_expired(pool: &DbPool) -> Result<u64, LockError> {
        let result = sqlx::query("DELETE FROM edit_locks WHERE expires_at <= ?1")
            .bind(now_ms())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Fetch the lock row for an object regardless of expiry, or `None`.
    pub async fn find_by_object_id(
        pool: &DbPool,
        object_id: DbId,
    ) -> Result<Option<EditLock>, LockError> {
        let query = format!("SELECT {COLUMNS} FROM edit_locks WHERE object_id = ?1");
        Ok(sqlx::query_as::<_, EditLock>(&query)
            .bind(object_id)
            .fetch_optional(pool)
            .await?)
    }
}
