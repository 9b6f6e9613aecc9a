//! Calendar ingestion contracts.

pub mod provider;
pub mod types;
