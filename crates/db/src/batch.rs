//! Best-effort batch execution: one transaction per item.
//!
//! Large cleanups deliberately trade all-or-nothing atomicity for failure
//! isolation — a failure on one item must not roll back or block the rest,
//! and the store is never locked for the whole batch. Per-item failures are
//! logged and collected into a [`BatchReport`] instead of aborting the loop.

use futures::future::BoxFuture;
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::DbPool;

/// One failed item in a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    /// Index of the item in the input slice.
    pub index: usize,
    pub error: String,
}

/// Outcome of a best-effort batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run `op` for each item, each inside its own freshly begun transaction.
///
/// A transaction is committed only when `op` returns `Ok`; on error (or a
/// failure to begin/commit) the transaction rolls back on drop, the failure
/// is logged under `label`, and the loop continues with the next item.
pub async fn for_each_in_own_tx<T, F>(
    pool: &DbPool,
    label: &str,
    items: &[T],
    mut op: F,
) -> BatchReport
where
    F: for<'c> FnMut(&'c mut SqliteConnection, &'c T) -> BoxFuture<'c, Result<(), sqlx::Error>>,
{
    let mut report = BatchReport {
        attempted: items.len(),
        succeeded: 0,
        failures: Vec::new(),
    };

    for (index, item) in items.iter().enumerate() {
        let outcome = async {
            let mut tx = pool.begin().await?;
            op(&mut *tx, item).await?;
            tx.commit().await
        }
        .await;

        match outcome {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                tracing::warn!(batch = label, index, error = %e, "Batch item failed, continuing");
                report.failures.push(BatchFailure {
                    index,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}
