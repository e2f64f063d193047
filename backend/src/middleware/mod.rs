//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route, currently
//! per-request trace ids.

pub mod trace;

pub use trace::Trace;
