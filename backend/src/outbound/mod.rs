//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: document stores (PostgreSQL via Diesel, in-memory)
//! - **speckle**: reqwest client for the Speckle auth and GraphQL APIs
//!
//! Adapters translate between domain types and wire or row shapes. They
//! contain no business logic.

pub mod persistence;
pub mod speckle;
