//! CLI command implementations.

pub mod favorite;
pub mod fetch;
pub mod list;
pub mod search;
pub mod show;
pub mod status;
