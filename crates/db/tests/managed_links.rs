//! Integration tests for the managed-link registry.
//!
//! - Save/lookup round-trips and surrogate id assignment
//! - Parent/child lookups across overlapping id ranges
//! - Per-link transaction isolation during batch deletes
//! - The idempotent orphan sweep against a fake content source

use std::collections::HashMap;

use assert_matches::assert_matches;
use async_trait::async_trait;
use sqlx::SqlitePool;
use stela_core::links::{LinkRef, UNPERSISTED_LINK_ID};
use stela_core::types::DbId;
use stela_db::error::LinkError;
use stela_db::models::managed_link::ManagedLink;
use stela_db::repositories::{ContentSource, ManagedLinkRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn saved(pool: &SqlitePool, parent: DbId, rev: i64, child: DbId, anchor: Option<&str>) -> ManagedLink {
    let mut link = ManagedLink::new(parent, rev, child, anchor.map(String::from));
    ManagedLinkRepo::save(pool, &mut link).await.unwrap();
    link
}

/// Content source backed by an in-memory map of parent revisions to the
/// references they currently contain.
struct MapSource(HashMap<(DbId, i64), Vec<LinkRef>>);

#[async_trait]
impl ContentSource for MapSource {
    async fn current_refs(
        &self,
        parent_id: DbId,
        parent_revision: i64,
    ) -> anyhow::Result<Option<Vec<LinkRef>>> {
        Ok(self.0.get(&(parent_id, parent_revision)).cloned())
    }
}

/// Content source that cannot answer for one specific parent.
struct FailingSource {
    inner: MapSource,
    failing_parent: DbId,
}

#[async_trait]
impl ContentSource for FailingSource {
    async fn current_refs(
        &self,
        parent_id: DbId,
        parent_revision: i64,
    ) -> anyhow::Result<Option<Vec<LinkRef>>> {
        if parent_id == self.failing_parent {
            anyhow::bail!("content store unavailable for parent {parent_id}");
        }
        self.inner.current_refs(parent_id, parent_revision).await
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn save_assigns_id_and_round_trips(pool: SqlitePool) {
    let mut link = ManagedLink::new(1, 1, 2, None);
    assert_eq!(link.id, UNPERSISTED_LINK_ID);
    assert!(!link.is_persisted());

    ManagedLinkRepo::save(&pool, &mut link).await.unwrap();
    assert!(link.is_persisted());

    let found = ManagedLinkRepo::find_by_link_id(&pool, link.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.parent_id, 1);
    assert_eq!(found.parent_revision, 1);
    assert_eq!(found.child_id, 2);
    assert_eq!(found.anchor, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn save_updates_an_already_persisted_link(pool: SqlitePool) {
    let mut link = saved(&pool, 1, 1, 2, None).await;

    link.anchor = Some("intro".to_string());
    link.parent_revision = 2;
    ManagedLinkRepo::save(&pool, &mut link).await.unwrap();

    let found = ManagedLinkRepo::find_by_link_id(&pool, link.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.anchor.as_deref(), Some("intro"));
    assert_eq!(found.parent_revision, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn updating_a_deleted_link_is_not_found(pool: SqlitePool) {
    let mut link = saved(&pool, 1, 1, 2, None).await;
    assert!(ManagedLinkRepo::delete(&pool, &link).await.unwrap());

    let err = ManagedLinkRepo::save(&pool, &mut link).await.unwrap_err();
    assert_matches!(err, LinkError::NotFound { .. });

    // Deleting again reports nothing removed, but is not an error.
    assert!(!ManagedLinkRepo::delete(&pool, &link).await.unwrap());
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn parent_and_child_lookups_are_scoped(pool: SqlitePool) {
    // Overlapping id ranges: parents and children share the same id space.
    for parent in 1..=4 {
        for child in 1..=4 {
            if parent != child {
                saved(&pool, parent, 1, child, None).await;
            }
        }
    }

    let from_two = ManagedLinkRepo::find_by_parent_id(&pool, 2).await.unwrap();
    assert_eq!(from_two.len(), 3);
    assert!(from_two.iter().all(|l| l.parent_id == 2));

    let to_three = ManagedLinkRepo::find_by_child_id(&pool, 3).await.unwrap();
    assert_eq!(to_three.len(), 3);
    assert!(to_three.iter().all(|l| l.child_id == 3));

    let from_pair = ManagedLinkRepo::find_by_parent_ids(&pool, &[1, 4]).await.unwrap();
    assert_eq!(from_pair.len(), 6);
    assert!(from_pair.iter().all(|l| l.parent_id == 1 || l.parent_id == 4));

    let none = ManagedLinkRepo::find_by_parent_ids(&pool, &[]).await.unwrap();
    assert!(none.is_empty());
}

// ---------------------------------------------------------------------------
// Batch delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn batch_delete_survives_an_invalid_link(pool: SqlitePool) {
    let a = saved(&pool, 1, 1, 2, None).await;
    let b = saved(&pool, 1, 1, 3, None).await;
    let c = saved(&pool, 2, 1, 3, None).await;

    // Make one link invalid before the batch runs.
    ManagedLinkRepo::delete(&pool, &b).await.unwrap();

    let report = ManagedLinkRepo::delete_each_isolated(&pool, &[a, b, c]).await;
    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert!(!report.all_succeeded());

    // All valid links were removed despite the failure in the middle.
    assert!(ManagedLinkRepo::find_by_parent_ids(&pool, &[1, 2])
        .await
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Orphan sweep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn orphan_sweep_removes_only_unbacked_links(pool: SqlitePool) {
    // Parent 1 rev 1 still references child 2 (no anchor) only.
    let keep = saved(&pool, 1, 1, 2, None).await;
    let dropped_anchor = saved(&pool, 1, 1, 2, Some("intro")).await;
    // Parent 9 no longer exists.
    let gone_parent = saved(&pool, 9, 3, 2, None).await;

    let source = MapSource(HashMap::from([((1, 1), vec![LinkRef::new(2, None)])]));
    let report = ManagedLinkRepo::cleanup_orphaned(&pool, &source).await.unwrap();
    assert_eq!(report.examined, 3);
    assert_eq!(report.orphaned, 2);
    assert_eq!(report.deleted, 2);
    assert_eq!(report.delete_failures, 0);

    assert!(ManagedLinkRepo::find_by_link_id(&pool, keep.id)
        .await
        .unwrap()
        .is_some());
    for orphan in [&dropped_anchor, &gone_parent] {
        assert!(ManagedLinkRepo::find_by_link_id(&pool, orphan.id)
            .await
            .unwrap()
            .is_none());
    }

    // Re-running the sweep is a no-op.
    let again = ManagedLinkRepo::cleanup_orphaned(&pool, &source).await.unwrap();
    assert_eq!(again.examined, 1);
    assert_eq!(again.orphaned, 0);
    assert_eq!(again.deleted, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn orphan_sweep_skips_parents_the_source_cannot_answer(pool: SqlitePool) {
    let unknown = saved(&pool, 5, 1, 2, None).await;
    saved(&pool, 9, 1, 2, None).await;

    let source = FailingSource {
        inner: MapSource(HashMap::new()),
        failing_parent: 5,
    };
    let report = ManagedLinkRepo::cleanup_orphaned(&pool, &source).await.unwrap();
    assert_eq!(report.skipped_parents, 1);
    assert_eq!(report.orphaned, 1);
    assert_eq!(report.deleted, 1);

    // The unanswerable parent's link survives for a later run.
    assert!(ManagedLinkRepo::find_by_link_id(&pool, unknown.id)
        .await
        .unwrap()
        .is_some());
}
