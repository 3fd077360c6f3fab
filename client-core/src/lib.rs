//! client-core: Shared infrastructure for the vacation workspace.
pub mod config;
pub mod observability;
