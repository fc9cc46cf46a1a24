//! Row models and input DTOs, one module per table.

pub mod change_event;
pub mod lock;
pub mod managed_link;
