//! Built-in handlers.

use async_trait::async_trait;
use stela_core::publishing::ChangeType;
use stela_db::repositories::ChangeEventRepo;
use stela_db::DbPool;

use crate::dispatch::ContentChangeHandler;
use crate::event::{EditAction, EditEvent};

/// Maps edit actions to pending-publish facts in the change ledger.
///
/// `Saved` marks content pending for staging, `Published` for live, and
/// `Deleted` for removal. Move and relationship events carry no publish
/// implication on their own and are ignored here.
pub struct PublishChangeHandler;

impl PublishChangeHandler {
    fn change_type_for(action: EditAction) -> Option<ChangeType> {
        match action {
            EditAction::Saved => Some(ChangeType::PendingStaged),
            EditAction::Published => Some(ChangeType::PendingLive),
            EditAction::Deleted => Some(ChangeType::PendingRemove),
            EditAction::Moved | EditAction::ReferenceAdded | EditAction::ReferenceRemoved => None,
        }
    }
}

#[async_trait]
impl ContentChangeHandler for PublishChangeHandler {
    fn name(&self) -> &str {
        "publish_change"
    }

    async fn on_edit(&self, pool: &DbPool, event: &EditEvent) -> anyhow::Result<()> {
        let Some(change_type) = Self::change_type_for(event.action) else {
            return Ok(());
        };
        ChangeEventRepo::record(pool, event.content_id, event.site_id, change_type).await?;
        Ok(())
    }
}
