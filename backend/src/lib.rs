//! Model checker backend library.
//!
//! Speckle sign-in, project browsing and ruleset maintenance served over
//! actix-web. The binary in `main.rs` wires these modules together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
