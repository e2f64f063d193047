//! GraphQL documents sent to the Speckle API.

pub(super) const ACTIVE_USER: &str = "query { activeUser { id name email avatar } }";

pub(super) const LIST_PROJECTS: &str = r"
query($projectsLimit: Int!, $modelsLimit: Int!, $versionsLimit: Int!, $modelsCursor: String, $projectsCursor: String) {
  activeUser {
    projects(limit: $projectsLimit, cursor: $projectsCursor) {
      totalCount
      cursor
      items {
        id
        name
        description
        models(limit: $modelsLimit, cursor: $modelsCursor) {
          totalCount
          cursor
          items {
            id
            name
            description
            previewUrl
            versions(limit: $versionsLimit) {
              items {
                sourceApplication
              }
            }
          }
        }
      }
    }
  }
}";

pub(super) const SEARCH_PROJECTS: &str = r"
query($filter: UserProjectsFilter, $modelsLimit: Int!, $versionsLimit: Int!) {
  activeUser {
    projects(filter: $filter) {
      items {
        id
        name
        description
        models(limit: $modelsLimit) {
          totalCount
          items {
            id
            name
            description
            previewUrl
            versions(limit: $versionsLimit) {
              items {
                sourceApplication
              }
            }
          }
        }
      }
    }
  }
}";

pub(super) const PROJECT_DETAILS: &str = r"
query($projectId: String!, $modelsLimit: Int!, $versionsLimit: Int!) {
  project(id: $projectId) {
    id
    name
    description
    models(limit: $modelsLimit) {
      totalCount
      items {
        id
        name
        description
        previewUrl
        versions(limit: $versionsLimit) {
          items {
            sourceApplication
          }
        }
      }
    }
  }
}";
