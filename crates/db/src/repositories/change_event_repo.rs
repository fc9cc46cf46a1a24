//! Repository for the `change_events` table.
//!
//! The ledger is the single source of truth for "what must the next
//! incremental publish run consider". The two operations that must be
//! correct under concurrency are the duplicate-safe upsert and the filtered
//! bulk delete — both are single statements keyed on the composite primary
//! key, so unrelated keys are never observed or blocked.

use stela_core::publishing::{ChangeType, SITE_WILDCARD};
use stela_core::types::DbId;

use crate::error::LedgerError;
use crate::DbPool;

/// Provides record/drain operations for pending change facts.
pub struct ChangeEventRepo;

impl ChangeEventRepo {
    /// Record a change fact. Concurrent duplicate calls collapse into one
    /// stored row. Returns `true` when a new fact was stored, `false` when
    /// the key already existed.
    pub async fn record(
        pool: &DbPool,
        content_id: DbId,
        site_id: DbId,
        change_type: ChangeType,
    ) -> Result<bool, LedgerError> {
        let result = sqlx::query(
            "INSERT INTO change_events (content_id, site_id, change_type) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT(content_id, site_id, change_type) DO NOTHING",
        )
        .bind(content_id)
        .bind(site_id)
        .bind(change_type.code())
        .execute(pool)
        .await
        .map_err(LedgerError::Save)?;
        Ok(result.rows_affected() > 0)
    }

    /// The de-duplicated set of content ids pending for a site and change
    /// type. Empty when nothing is pending — never an error.
    pub async fn changed_content(
        pool: &DbPool,
        site_id: DbId,
        change_type: ChangeType,
    ) -> Result<Vec<DbId>, LedgerError> {
        sqlx::query_scalar(
            "SELECT content_id FROM change_events \
             WHERE site_id = ?1 AND change_type = ?2 \
             ORDER BY content_id",
        )
        .bind(site_id)
        .bind(change_type.code())
        .fetch_all(pool)
        .await
        .map_err(LedgerError::Load)
    }

    /// Delete the facts for one content id, optionally narrowed to a site
    /// (`SITE_WILDCARD` ignores the site filter) and/or a change type.
    /// Returns the rows deleted.
    pub async fn delete(
        pool: &DbPool,
        site_id: DbId,
        content_id: DbId,
        change_type: Option<ChangeType>,
    ) -> Result<u64, LedgerError> {
        let mut query = String::from("DELETE FROM change_events WHERE content_id = ?");
        if site_id != SITE_WILDCARD {
            query.push_str(" AND site_id = ?");
        }
        if change_type.is_some() {
            query.push_str(" AND change_type = ?");
        }

        let mut q = sqlx::query(&query).bind(content_id);
        if site_id != SITE_WILDCARD {
            q = q.bind(site_id);
        }
        if let Some(ct) = change_type {
            q = q.bind(ct.code());
        }
        let result = q.execute(pool).await.map_err(LedgerError::Delete)?;
        Ok(result.rows_affected())
    }

    /// Drain a whole site, optionally narrowed to one change type. Called by
    /// the publish job after a successful run. `SITE_WILDCARD` drains every
    /// site. Returns the rows deleted.
    pub async fn delete_for_site(
        pool: &DbPool,
        site_id: DbId,
        change_type: Option<ChangeType>,
    ) -> Result<u64, LedgerError> {
        let mut query = String::from("DELETE FROM change_events WHERE 1 = 1");
        if site_id != SITE_WILDCARD {
            query.push_str(" AND site_id = ?");
        }
        if change_type.is_some() {
            query.push_str(" AND change_type = ?");
        }

        let mut q = sqlx::query(&query);
        if site_id != SITE_WILDCARD {
            q = q.bind(site_id);
        }
        if let Some(ct) = change_type {
            q = q.bind(ct.code());
        }
        let result = q.execute(pool).await.map_err(LedgerError::Delete)?;
        Ok(result.rows_affected())
    }

    /// Pending counts per change type for a site, so a publish job can size
    /// its run before draining.
    pub async fn pending_summary(
        pool: &DbPool,
        site_id: DbId,
    ) -> Result<Vec<(ChangeType, i64)>, LedgerError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT change_type, COUNT(*) FROM change_events \
             WHERE site_id = ?1 \
             GROUP BY change_type \
             ORDER BY change_type",
        )
        .bind(site_id)
        .fetch_all(pool)
        .await
        .map_err(LedgerError::Load)?;

        let mut summary = Vec::with_capacity(rows.len());
        for (code, count) in rows {
            match ChangeType::from_code(&code) {
                Some(ct) => summary.push((ct, count)),
                None => {
                    tracing::warn!(code = %code, "Skipping change events with unknown change type");
                }
            }
        }
        Ok(summary)
    }
}
