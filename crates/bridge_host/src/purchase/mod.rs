//! Purchase contracts.

pub mod backend;
pub mod types;
