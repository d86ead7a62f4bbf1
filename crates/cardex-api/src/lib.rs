//! Cardex API - HTTP server for the card catalog
//!
//! Browse, search, autocomplete, and synergy endpoints over the storage
//! and knowledge layers.

pub mod catalog;
pub mod error;
pub mod handlers;
pub mod params;
pub mod server;

pub use error::ApiError;
pub use server::{create_router, run_server, AppState};
