//! Repository for the `managed_links` table.
//!
//! Directed parent→child link records plus the orphan sweep. Batch removal
//! deliberately runs one transaction per link: a failure removing one link
//! must not prevent removal of the others and must not roll back deletions
//! already committed.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use stela_core::links::{is_orphaned, LinkRef};
use stela_core::types::DbId;

use crate::batch::{self, BatchReport};
use crate::error::LinkError;
use crate::models::managed_link::ManagedLink;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, parent_id, parent_revision, child_id, anchor";

/// The content model, seen through the only two questions the link sweep
/// asks of it. Implemented by the surrounding deployment; the registry never
/// reads content itself.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// The references currently contained by a parent revision, or `None`
    /// when the parent no longer exists.
    async fn current_refs(
        &self,
        parent_id: DbId,
        parent_revision: i64,
    ) -> anyhow::Result<Option<Vec<LinkRef>>>;
}

/// Outcome of an orphan sweep.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    /// Links examined across all parents.
    pub examined: usize,
    /// Links judged orphaned.
    pub orphaned: usize,
    /// Orphaned links actually deleted.
    pub deleted: usize,
    /// Parents skipped because the content source failed for them.
    pub skipped_parents: usize,
    /// Per-link delete failures, logged and skipped.
    pub delete_failures: usize,
}

/// Provides CRUD, lookup, and sweep operations for managed links.
pub struct ManagedLinkRepo;

impl ManagedLinkRepo {
    /// Persist a link. A fresh link (id `-1`) is inserted and assigned its
    /// surrogate id in place; an already-persisted link is updated.
    pub async fn save(pool: &DbPool, link: &mut ManagedLink) -> Result<(), LinkError> {
        if !link.is_persisted() {
            let id: DbId = sqlx::query_scalar(
                "INSERT INTO managed_links (parent_id, parent_revision, child_id, anchor) \
                 VALUES (?1, ?2, ?3, ?4) \
                 RETURNING id",
            )
            .bind(link.parent_id)
            .bind(link.parent_revision)
            .bind(link.child_id)
            .bind(&link.anchor)
            .fetch_one(pool)
            .await
            .map_err(LinkError::Save)?;
            link.id = id;
            return Ok(());
        }

        let result = sqlx::query(
            "UPDATE managed_links \
             SET parent_id = ?2, parent_revision = ?3, child_id = ?4, anchor = ?5 \
             WHERE id = ?1",
        )
        .bind(link.id)
        .bind(link.parent_id)
        .bind(link.parent_revision)
        .bind(link.child_id)
        .bind(&link.anchor)
        .execute(pool)
        .await
        .map_err(LinkError::Save)?;

        if result.rows_affected() == 0 {
            return Err(LinkError::NotFound { link_id: link.id });
        }
        Ok(())
    }

    /// Fetch a link by its surrogate id.
    pub async fn find_by_link_id(
        pool: &DbPool,
        link_id: DbId,
    ) -> Result<Option<ManagedLink>, LinkError> {
        let query = format!("SELECT {COLUMNS} FROM managed_links WHERE id = ?1");
        sqlx::query_as::<_, ManagedLink>(&query)
            .bind(link_id)
            .fetch_optional(pool)
            .await
            .map_err(LinkError::Load)
    }

    /// Delete a single link. Returns `false` when it was already gone.
    pub async fn delete(pool: &DbPool, link: &ManagedLink) -> Result<bool, LinkError> {
        let result = sqlx::query("DELETE FROM managed_links WHERE id = ?1")
            .bind(link.id)
            .execute(pool)
            .await
            .map_err(LinkError::Delete)?;
        Ok(result.rows_affected() > 0)
    }

    /// Links recorded by one parent revision's owner, i.e. "what does this
    /// content reference".
    pub async fn find_by_parent_id(
        pool: &DbPool,
        parent_id: DbId,
    ) -> Result<Vec<ManagedLink>, LinkError> {
        let query = format!("SELECT {COLUMNS} FROM managed_links WHERE parent_id = ?1 ORDER BY id");
        sqlx::query_as::<_, ManagedLink>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
            .map_err(LinkError::Load)
    }

    /// Links for any of the given parents.
    pub async fn find_by_parent_ids(
        pool: &DbPool,
        parent_ids: &[DbId],
    ) -> Result<Vec<ManagedLink>, LinkError> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; parent_ids.len()].join(", ");
        let query = format!(
            "SELECT {COLUMNS} FROM managed_links \
             WHERE parent_id IN ({placeholders}) ORDER BY id"
        );
        let mut q = sqlx::query_as::<_, ManagedLink>(&query);
        for id in parent_ids {
            q = q.bind(id);
        }
        q.fetch_all(pool).await.map_err(LinkError::Load)
    }

    /// Links pointing at a target, i.e. "what references this resource".
    pub async fn find_by_child_id(
        pool: &DbPool,
        child_id: DbId,
    ) -> Result<Vec<ManagedLink>, LinkError> {
        let query = format!("SELECT {COLUMNS} FROM managed_links WHERE child_id = ?1 ORDER BY id");
        sqlx::query_as::<_, ManagedLink>(&query)
            .bind(child_id)
            .fetch_all(pool)
            .await
            .map_err(LinkError::Load)
    }

    /// Delete a batch where each link is removed in its own independent
    /// transaction. A link that is already gone counts as a failure in the
    /// report but never stops the rest of the batch.
    pub async fn delete_each_isolated(pool: &DbPool, links: &[ManagedLink]) -> BatchReport {
        batch::for_each_in_own_tx(pool, "managed_link_delete", links, |conn, link| {
            Box::pin(async move {
                let result = sqlx::query("DELETE FROM managed_links WHERE id = ?1")
                    .bind(link.id)
                    .execute(&mut *conn)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(sqlx::Error::RowNotFound);
                }
                Ok(())
            })
        })
        .await
    }

    /// Idempotent sweep removing links whose parent no longer exists or no
    /// longer contains the recorded reference.
    ///
    /// Parents the content source cannot answer for are logged and skipped;
    /// deletions are per-link isolated. Safe to re-run at any time.
    pub async fn cleanup_orphaned(
        pool: &DbPool,
        source: &dyn ContentSource,
    ) -> Result<CleanupReport, LinkError> {
        let query = format!("SELECT {COLUMNS} FROM managed_links ORDER BY id");
        let links = sqlx::query_as::<_, ManagedLink>(&query)
            .fetch_all(pool)
            .await
            .map_err(LinkError::Load)?;

        let mut by_parent: BTreeMap<(DbId, i64), Vec<ManagedLink>> = BTreeMap::new();
        for link in links {
            by_parent
                .entry((link.parent_id, link.parent_revision))
                .or_default()
                .push(link);
        }

        let mut report = CleanupReport {
            examined: 0,
            orphaned: 0,
            deleted: 0,
            skipped_parents: 0,
            delete_failures: 0,
        };

        let mut orphans = Vec::new();
        for ((parent_id, parent_revision), parent_links) in by_parent {
            report.examined += parent_links.len();
            let refs = match source.current_refs(parent_id, parent_revision).await {
                Ok(refs) => refs,
                Err(e) => {
                    tracing::warn!(
                        parent_id,
                        parent_revision,
                        error = %e,
                        "Content source failed for parent, skipping its links"
                    );
                    report.skipped_parents += 1;
                    continue;
                }
            };
            for link in parent_links {
                if is_orphaned(link.child_id, link.anchor.as_deref(), refs.as_deref()) {
                    orphans.push(link);
                }
            }
        }

        report.orphaned = orphans.len();
        let deleted = Self::delete_each_isolated(pool, &orphans).await;
        report.deleted = deleted.succeeded;
        report.delete_failures = deleted.failures.len();

        if report.orphaned > 0 {
            tracing::info!(
                orphaned = report.orphaned,
                deleted = report.deleted,
                "Orphaned managed links removed"
            );
        }
        Ok(report)
    }
}
