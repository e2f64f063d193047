//! Read-only Speckle project and model metadata.
//!
//! These values are fetched live for display and never persisted. Field
//! names follow the Speckle GraphQL schema so the same types decode the
//! upstream payload and feed the view templates.

use serde::{Deserialize, Serialize};

/// A Speckle project with a page of its models.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub models: ModelCollection,
}

/// Page of models nested under a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelCollection {
    pub total_count: u64,
    pub cursor: Option<String>,
    pub items: Vec<Model>,
}

/// A model within a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub preview_url: Option<String>,
    pub versions: VersionCollection,
    pub total_count: u64,
    pub cursor: Option<String>,
}

impl Model {
    /// Source application of the most recent version, when known.
    pub fn latest_source_application(&self) -> Option<&str> {
        self.versions
            .items
            .first()
            .and_then(|version| version.source_application.as_deref())
    }
}

/// Versions nested under a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionCollection {
    pub items: Vec<Version>,
}

/// A single model version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Version {
    pub source_application: Option<String>,
}

/// One page of the active user's projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectPage {
    pub total_count: u64,
    pub cursor: Option<String>,
    pub items: Vec<Project>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_sparse_search_payload() {
        let project: Project = serde_json::from_value(json!({
            "id": "p1",
            "name": "Tower",
            "description": null,
            "models": {
                "totalCount": 1,
                "items": [{
                    "id": "m1",
                    "name": "structure",
                    "previewUrl": "https://example.test/preview",
                    "versions": {"items": [{"sourceApplication": "Revit"}]}
                }]
            }
        }))
        .expect("decode project");

        assert_eq!(project.models.total_count, 1);
        assert!(project.models.cursor.is_none());
        let model = project.models.items.first().expect("model");
        assert_eq!(model.latest_source_application(), Some("Revit"));
    }

    #[test]
    fn model_without_versions_has_no_source_application() {
        assert!(Model::default().latest_source_application().is_none());
    }
}
