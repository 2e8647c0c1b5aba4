//! Calls and events of the canonical transaction chain and state commitment chain contracts.

pub mod calls;
pub mod logs;
