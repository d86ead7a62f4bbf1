//! CLI command implementations

pub mod completions;
pub mod filters;
pub mod search;
pub mod serve;
pub mod show;
