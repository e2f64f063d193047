//! Document persistence adapters.
//!
//! - [`DieselDocumentStore`]: PostgreSQL via Diesel, `diesel-async` and a
//!   `bb8` pool. Rows live in a single `documents` table.
//! - [`MemoryDocumentStore`]: volatile fallback for local runs and tests.
//!
//! Row structs and the schema stay private to this module.

mod diesel_document_store;
mod memory_document_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_document_store::DieselDocumentStore;
pub use memory_document_store::MemoryDocumentStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
