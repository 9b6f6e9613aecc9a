//! Sandboxed storage contracts.

pub mod name;
pub mod types;
