//! Inbound adapters translating HTTP requests into domain service calls.
//!
//! Framework details stay here; the domain never sees actix-web types.

pub mod http;
