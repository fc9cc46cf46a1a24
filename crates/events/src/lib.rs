//! Edit-event fan-out for the change ledger.
//!
//! The editing workflow raises an [`EditEvent`] whenever content is saved,
//! published, deleted, moved, or its relationships change. A
//! [`ChangeDispatcher`] hands each event to every registered
//! [`ContentChangeHandler`] in registration order; each handler independently
//! decides whether and what to write to the ledger. This is a fan-out, not a
//! pipeline — a failing handler is logged and never suppresses the others.

pub mod dispatch;
pub mod event;
pub mod handlers;

pub use dispatch::{ChangeDispatcher, ContentChangeHandler, DispatchReport};
pub use event::{EditAction, EditEvent};
pub use handlers::PublishChangeHandler;
