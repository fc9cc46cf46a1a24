//! Domain types and pure logic for the edit-coordination core.
//!
//! This crate has no database dependencies — all data access lives in
//! `stela-db`. It provides:
//!
//! - Shared id/time aliases ([`types`])
//! - Lock ownership and TTL rules ([`locking`])
//! - Publish change types and site filter sentinels ([`publishing`])
//! - Managed-link reference types and the orphan decision ([`links`])

pub mod links;
pub mod locking;
pub mod publishing;
pub mod types;
