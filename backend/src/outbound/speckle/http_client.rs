//! Reqwest-backed Speckle adapter.
//!
//! The adapter owns transport details only: request serialisation, timeout,
//! status checks and JSON decoding into domain read models. Every call is
//! attempted once.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{
    ActiveUserDataDto, GraphqlEnvelopeDto, GraphqlRequestDto, ListProjectsDataDto,
    ListProjectsVariablesDto, ProfileDto, ProjectDataDto, ProjectDetailsVariablesDto,
    SearchFilterDto, SearchProjectsDataDto, SearchProjectsVariablesDto, TokenResponseDto,
};
use super::queries;
use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, MODELS_PER_PROJECT, ProjectCatalogue,
    ProjectCatalogueError, VERSIONS_PER_MODEL,
};
use crate::domain::{
    AccessCode, AppCredentials, BearerToken, ChallengeId, Project, ProjectPage, TokenGrant, User,
};

/// Errors raised while constructing the adapter.
#[derive(Debug, thiserror::Error)]
pub enum SpeckleClientBuildError {
    #[error("invalid Speckle server URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failure of one GraphQL round trip, before port-specific mapping.
#[derive(Debug)]
enum GraphqlFailure {
    Transport(String),
    Status(u16),
    Decode(String),
}

impl From<GraphqlFailure> for ProjectCatalogueError {
    fn from(failure: GraphqlFailure) -> Self {
        match failure {
            GraphqlFailure::Transport(message) => Self::transport(message),
            GraphqlFailure::Status(status) => Self::status(status),
            GraphqlFailure::Decode(message) => Self::decode(message),
        }
    }
}

impl From<GraphqlFailure> for IdentityProviderError {
    fn from(failure: GraphqlFailure) -> Self {
        match failure {
            GraphqlFailure::Transport(message) => Self::profile_fetch(None::<u16>, message),
            GraphqlFailure::Status(status) => {
                Self::profile_fetch(Some(status), format!("unexpected status code: {status}"))
            }
            GraphqlFailure::Decode(message) => Self::profile_decode(message),
        }
    }
}

/// Speckle client bound to one server, e.g. `https://app.speckle.systems`.
pub struct SpeckleHttpClient {
    client: Client,
    server_url: String,
    token_url: Url,
    graphql_url: Url,
}

impl SpeckleHttpClient {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the server URL is invalid or the reqwest client
    /// cannot be constructed.
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, SpeckleClientBuildError> {
        let server_url = server_url.trim().trim_end_matches('/').to_owned();
        let token_url = Url::parse(&format!("{server_url}/auth/token"))?;
        let graphql_url = Url::parse(&format!("{server_url}/graphql"))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            server_url,
            token_url,
            graphql_url,
        })
    }

    async fn graphql<V, T>(
        &self,
        token: &BearerToken,
        query: &str,
        variables: Option<V>,
    ) -> Result<T, GraphqlFailure>
    where
        V: Serialize + Send + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.graphql_url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", token.expose()))
            .json(&GraphqlRequestDto { query, variables })
            .send()
            .await
            .map_err(|error| GraphqlFailure::Transport(describe_transport_error(&error)))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(status = status.as_u16(), "speckle graphql rejected request");
            return Err(GraphqlFailure::Status(status.as_u16()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|error| GraphqlFailure::Transport(describe_transport_error(&error)))?;
        decode_envelope(body.as_ref()).map_err(GraphqlFailure::Decode)
    }
}

fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, String> {
    let envelope: GraphqlEnvelopeDto<T> = serde_json::from_slice(body)
        .map_err(|error| format!("invalid GraphQL JSON payload: {error}"))?;
    envelope.into_data()
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    }
}

#[async_trait]
impl IdentityProvider for SpeckleHttpClient {
    fn authorization_url(&self, app_id: &str, challenge: &ChallengeId) -> String {
        format!(
            "{}/authn/verify/{app_id}/{}",
            self.server_url,
            challenge.as_str()
        )
    }

    async fn exchange_code(
        &self,
        credentials: &AppCredentials,
        code: &AccessCode,
        challenge: &ChallengeId,
    ) -> Result<TokenGrant, IdentityProviderError> {
        let form = [
            ("accessCode", code.expose()),
            ("appId", credentials.app_id()),
            ("appSecret", credentials.app_secret()),
            ("challenge", challenge.as_str()),
        ];
        let response = self
            .client
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|error| {
                IdentityProviderError::token_exchange(None::<u16>, describe_transport_error(&error))
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IdentityProviderError::token_exchange(
                Some(status.as_u16()),
                format!("unexpected status code: {}", status.as_u16()),
            ));
        }
        let body = response.bytes().await.map_err(|error| {
            IdentityProviderError::token_exchange(None::<u16>, describe_transport_error(&error))
        })?;
        let decoded: TokenResponseDto = serde_json::from_slice(body.as_ref())
            .map_err(|error| IdentityProviderError::token_decode(error.to_string()))?;
        Ok(TokenGrant {
            token: BearerToken::new(decoded.token),
            refresh_token: decoded
                .refresh_token
                .filter(|value| !value.is_empty())
                .map(BearerToken::new),
        })
    }

    async fn active_user(&self, token: &BearerToken) -> Result<User, IdentityProviderError> {
        let data: ActiveUserDataDto<ProfileDto> = self
            .graphql(token, queries::ACTIVE_USER, None::<()>)
            .await?;
        let profile = data
            .active_user
            .ok_or_else(|| IdentityProviderError::profile_decode("activeUser was null"))?;
        profile
            .into_domain()
            .map_err(IdentityProviderError::profile_decode)
    }
}

#[async_trait]
impl ProjectCatalogue for SpeckleHttpClient {
    async fn list_projects(
        &self,
        token: &BearerToken,
        limit: u32,
        cursor: Option<String>,
    ) -> Result<ProjectPage, ProjectCatalogueError> {
        let variables = ListProjectsVariablesDto {
            projects_limit: limit,
            models_limit: MODELS_PER_PROJECT,
            versions_limit: VERSIONS_PER_MODEL,
            models_cursor: None,
            projects_cursor: cursor,
        };
        let data: ListProjectsDataDto = self
            .graphql(token, queries::LIST_PROJECTS, Some(variables))
            .await?;
        data.active_user
            .map(|user| user.projects)
            .ok_or_else(|| ProjectCatalogueError::decode("activeUser was null"))
    }

    async fn search_projects(
        &self,
        token: &BearerToken,
        query: &str,
        models_limit: u32,
        versions_limit: u32,
    ) -> Result<Vec<Project>, ProjectCatalogueError> {
        let variables = SearchProjectsVariablesDto {
            filter: SearchFilterDto { search: query },
            models_limit,
            versions_limit,
        };
        let data: SearchProjectsDataDto = self
            .graphql(token, queries::SEARCH_PROJECTS, Some(variables))
            .await?;
        data.active_user
            .map(|user| user.projects.items)
            .ok_or_else(|| ProjectCatalogueError::decode("activeUser was null"))
    }

    async fn project_details(
        &self,
        token: &BearerToken,
        project_id: &str,
    ) -> Result<Project, ProjectCatalogueError> {
        let variables = ProjectDetailsVariablesDto {
            project_id,
            models_limit: MODELS_PER_PROJECT,
            versions_limit: VERSIONS_PER_MODEL,
        };
        let data: ProjectDataDto = self
            .graphql(token, queries::PROJECT_DETAILS, Some(variables))
            .await?;
        data.project
            .ok_or_else(|| ProjectCatalogueError::decode(format!("project {project_id} was null")))
    }
}
