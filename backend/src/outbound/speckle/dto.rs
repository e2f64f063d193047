//! Transport DTOs for the Speckle REST and GraphQL endpoints.
//!
//! Project payloads decode straight into the domain read models; only the
//! envelope, variables and profile need dedicated shapes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{Project, ProjectPage, User, UserId};

#[derive(Debug, Serialize)]
pub(super) struct GraphqlRequestDto<'a, V> {
    pub(super) query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) variables: Option<V>,
}

#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub(super) struct GraphqlEnvelopeDto<T> {
    pub(super) data: Option<T>,
    #[serde(default)]
    pub(super) errors: Vec<GraphqlErrorDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphqlErrorDto {
    #[serde(default)]
    pub(super) message: String,
}

impl<T> GraphqlEnvelopeDto<T> {
    /// Unwrap `data`, treating GraphQL errors or a missing payload as failures.
    pub(super) fn into_data(self) -> Result<T, String> {
        if !self.errors.is_empty() {
            let messages: Vec<_> = self.errors.into_iter().map(|error| error.message).collect();
            return Err(format!("graphql errors: {}", messages.join("; ")));
        }
        self.data
            .ok_or_else(|| "response carried no data object".to_owned())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListProjectsVariablesDto {
    pub(super) projects_limit: u32,
    pub(super) models_limit: u32,
    pub(super) versions_limit: u32,
    pub(super) models_cursor: Option<String>,
    pub(super) projects_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchProjectsVariablesDto<'a> {
    pub(super) filter: SearchFilterDto<'a>,
    pub(super) models_limit: u32,
    pub(super) versions_limit: u32,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchFilterDto<'a> {
    pub(super) search: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProjectDetailsVariablesDto<'a> {
    pub(super) project_id: &'a str,
    pub(super) models_limit: u32,
    pub(super) versions_limit: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ActiveUserDataDto<T> {
    pub(super) active_user: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProjectsFieldDto<T> {
    pub(super) projects: T,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProjectItemsDto {
    #[serde(default)]
    pub(super) items: Vec<Project>,
}

pub(super) type ListProjectsDataDto = ActiveUserDataDto<ProjectsFieldDto<ProjectPage>>;
pub(super) type SearchProjectsDataDto = ActiveUserDataDto<ProjectsFieldDto<ProjectItemsDto>>;

#[derive(Debug, Deserialize)]
pub(super) struct ProjectDataDto {
    pub(super) project: Option<Project>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProfileDto {
    pub(super) id: String,
    #[serde(default)]
    pub(super) name: Option<String>,
    #[serde(default)]
    pub(super) email: Option<String>,
    #[serde(default)]
    pub(super) avatar: Option<String>,
}

impl ProfileDto {
    pub(super) fn into_domain(self) -> Result<User, String> {
        let id = UserId::new(self.id).map_err(|error| format!("invalid user id: {error}"))?;
        Ok(User::new(
            id,
            self.name.unwrap_or_default(),
            self.email.unwrap_or_default(),
        )
        .with_avatar(self.avatar))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TokenResponseDto {
    pub(super) token: String,
    #[serde(default)]
    pub(super) refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn envelope_yields_data() {
        let envelope: GraphqlEnvelopeDto<ProjectDataDto> = serde_json::from_value(json!({
            "data": {"project": {"id": "p1", "name": "Tower"}}
        }))
        .expect("envelope");
        let data = envelope.into_data().expect("data");
        assert_eq!(data.project.map(|project| project.name), Some("Tower".to_owned()));
    }

    #[rstest]
    #[case::missing_data(json!({}), "no data")]
    #[case::null_data(json!({"data": null}), "no data")]
    #[case::errors(json!({"data": null, "errors": [{"message": "forbidden"}]}), "forbidden")]
    fn envelope_failures_are_reported(#[case] body: serde_json::Value, #[case] needle: &str) {
        let envelope: GraphqlEnvelopeDto<ProjectDataDto> =
            serde_json::from_value(body).expect("envelope");
        let error = envelope.into_data().expect_err("failure");
        assert!(error.contains(needle), "{error}");
    }

    #[rstest]
    fn list_variables_use_camel_case() {
        let variables = ListProjectsVariablesDto {
            projects_limit: 5,
            models_limit: 20,
            versions_limit: 1,
            models_cursor: None,
            projects_cursor: Some("abc".to_owned()),
        };
        assert_eq!(
            serde_json::to_value(variables).expect("serialise"),
            json!({
                "projectsLimit": 5,
                "modelsLimit": 20,
                "versionsLimit": 1,
                "modelsCursor": null,
                "projectsCursor": "abc",
            })
        );
    }

    #[rstest]
    fn profile_maps_missing_fields_to_blank() {
        let profile: ProfileDto =
            serde_json::from_value(json!({"id": "u1", "name": null})).expect("profile");
        let user = profile.into_domain().expect("user");
        assert_eq!(user.id().as_ref(), "u1");
        assert_eq!(user.name(), "");
        assert_eq!(user.avatar(), None);
    }

    #[rstest]
    fn profile_rejects_blank_id() {
        let profile: ProfileDto = serde_json::from_value(json!({"id": ""})).expect("profile");
        assert!(profile.into_domain().is_err());
    }
}
