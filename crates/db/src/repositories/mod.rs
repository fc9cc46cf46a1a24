//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&DbPool` as the first argument. Correctness under concurrent
//! callers comes from the store's conditional writes, never from
//! read-then-write sequences at this layer.

pub mod change_event_repo;
pub mod lock_repo;
pub mod managed_link_repo;

pub use change_event_repo::ChangeEventRepo;
pub use lock_repo::LockRepo;
pub use managed_link_repo::{CleanupReport, ContentSource, ManagedLinkRepo};
