//! Port for reading project and model metadata from Speckle.

use async_trait::async_trait;

use crate::domain::{BearerToken, Project, ProjectPage};

use super::define_port_error;

/// Models fetched per project by listing and detail queries.
pub const MODELS_PER_PROJECT: u32 = 20;
/// Versions fetched per model by listing and detail queries.
pub const VERSIONS_PER_MODEL: u32 = 1;

define_port_error! {
    /// Errors raised by project catalogue adapters.
    pub enum ProjectCatalogueError {
        /// The request could not be sent or the body could not be read.
        Transport { message: String } => "speckle request failed: {message}",
        /// The API answered with a non-200 status.
        Status { status: u16 } => "unexpected status code: {status}",
        /// The response body did not match the expected shape.
        Decode { message: String } => "failed to decode response: {message}",
    }
}

/// Read-only queries against the Speckle GraphQL API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectCatalogue: Send + Sync {
    /// One page of the active user's projects.
    ///
    /// Each project carries up to [`MODELS_PER_PROJECT`] models with
    /// [`VERSIONS_PER_MODEL`] version each, regardless of `limit`.
    async fn list_projects(
        &self,
        token: &BearerToken,
        limit: u32,
        cursor: Option<String>,
    ) -> Result<ProjectPage, ProjectCatalogueError>;

    /// Projects matching a free-text search. No pagination cursor.
    async fn search_projects(
        &self,
        token: &BearerToken,
        query: &str,
        models_limit: u32,
        versions_limit: u32,
    ) -> Result<Vec<Project>, ProjectCatalogueError>;

    /// A single project with its models.
    async fn project_details(
        &self,
        token: &BearerToken,
        project_id: &str,
    ) -> Result<Project, ProjectCatalogueError>;
}
