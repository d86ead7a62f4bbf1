//! Cardex Storage - SQLite-backed persistence for the card catalog
//!
//! This crate turns the core query model into parameterized SQL and runs
//! it against a SQLite database. An in-memory backend with the same
//! semantics backs tests and demos.

pub mod error;
pub mod memory;
pub mod plan;
pub mod sqlite;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use plan::{build_plan, PlanParam, QueryPlan};
pub use sqlite::SqliteStore;
pub use traits::CardStore;
