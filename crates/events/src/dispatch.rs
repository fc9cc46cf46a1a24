//! Ordered handler fan-out with per-handler failure isolation.

use async_trait::async_trait;
use stela_db::DbPool;

use crate::event::EditEvent;

/// A registered consumer of edit events.
///
/// Handlers are independent: each sees every dispatched event and decides on
/// its own whether to record anything. A handler error is logged by the
/// dispatcher and does not affect the other handlers.
#[async_trait]
pub trait ContentChangeHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn on_edit(&self, pool: &DbPool, event: &EditEvent) -> anyhow::Result<()>;
}

/// Counts from one dispatch round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers invoked (always the full registration list).
    pub invoked: usize,
    /// Handlers that returned an error.
    pub failed: usize,
}

/// Invokes every registered handler, in registration order, for each event.
///
/// Constructed once at process start and passed by reference — there is no
/// process-wide registry.
#[derive(Default)]
pub struct ChangeDispatcher {
    handlers: Vec<Box<dyn ContentChangeHandler>>,
}

impl ChangeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Handlers run in the order they were added.
    pub fn add_handler(&mut self, handler: Box<dyn ContentChangeHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Hand the event to every handler. Each failure is logged individually;
    /// the remaining handlers still run.
    pub async fn dispatch(&self, pool: &DbPool, event: &EditEvent) -> DispatchReport {
        let mut failed = 0;
        for handler in &self.handlers {
            if let Err(e) = handler.on_edit(pool, event).await {
                tracing::error!(
                    handler = handler.name(),
                    content_id = event.content_id,
                    site_id = event.site_id,
                    error = %e,
                    "Content change handler failed"
                );
                failed += 1;
            }
        }
        DispatchReport {
            invoked: self.handlers.len(),
            failed,
        }
    }
}
