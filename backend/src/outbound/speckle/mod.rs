//! Speckle outbound adapters.
//!
//! A single reqwest client implements both the `IdentityProvider` and the
//! `ProjectCatalogue` ports against one Speckle server.

mod dto;
mod http_client;
mod queries;

pub use http_client::{SpeckleClientBuildError, SpeckleHttpClient};
