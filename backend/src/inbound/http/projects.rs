//! Project browsing handlers backed by the Speckle catalogue.
//!
//! Every route needs a signed-in user with a stored bearer token; otherwise
//! the browser is sent back to `/`.

use actix_web::{get, web};
use serde::Deserialize;
use tracing::{error, warn};

use crate::domain::{BearerToken, ProjectPage, User};
use crate::inbound::http::error::{PageError, PageResult};
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{self, redirect};

/// Projects per listing page.
pub const PAGE_SIZE: u32 = 5;
const SEARCH_MODELS_LIMIT: u32 = 5;
const SEARCH_VERSIONS_LIMIT: u32 = 5;

/// Token stored for `user`. Lookup failures are logged and treated as absent.
pub(crate) async fn stored_token(state: &HttpState, user: &User) -> Option<BearerToken> {
    match state.auth.token_for(user.id()).await {
        Ok(token) => token,
        Err(err) => {
            warn!(user_id = %user.id(), error = %err, "failed to read stored token");
            None
        }
    }
}

/// Cursor of the next page, offered only when this page is full.
pub(crate) fn next_cursor(page: &ProjectPage) -> Option<&str> {
    if page.items.len() == PAGE_SIZE as usize {
        page.cursor.as_deref()
    } else {
        None
    }
}

async fn signed_in(state: &HttpState, current: CurrentUser) -> Option<(User, BearerToken)> {
    let user = current.into_user()?;
    let token = stored_token(state, &user).await?;
    Some((user, token))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub cursor: Option<String>,
}

#[get("/projects")]
pub async fn list(
    state: web::Data<HttpState>,
    current: CurrentUser,
    query: web::Query<ListQuery>,
) -> PageResult {
    let Some((user, token)) = signed_in(&state, current).await else {
        return Ok(redirect("/"));
    };
    let cursor = query.into_inner().cursor.filter(|value| !value.is_empty());
    let page = state
        .catalogue
        .list_projects(&token, PAGE_SIZE, cursor)
        .await
        .map_err(|err| {
            error!(error = %err, "project listing failed");
            PageError::internal("Failed to fetch projects")
        })?;
    views::respond(views::projects(&user, &page, next_cursor(&page), None))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[get("/projects/search")]
pub async fn search(
    state: web::Data<HttpState>,
    current: CurrentUser,
    query: web::Query<SearchQuery>,
) -> PageResult {
    let Some((user, token)) = signed_in(&state, current).await else {
        return Ok(redirect("/"));
    };
    let term = query.q.trim();
    if term.is_empty() {
        return Ok(redirect("/projects"));
    }
    let items = state
        .catalogue
        .search_projects(&token, term, SEARCH_MODELS_LIMIT, SEARCH_VERSIONS_LIMIT)
        .await
        .map_err(|err| {
            error!(error = %err, "project search failed");
            PageError::internal("Failed to search projects")
        })?;
    let page = ProjectPage {
        total_count: items.len() as u64,
        cursor: None,
        items,
    };
    views::respond(views::projects(&user, &page, None, Some(term)))
}

#[get("/projects/{project_id}")]
pub async fn detail(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<String>,
) -> PageResult {
    let Some((user, token)) = signed_in(&state, current).await else {
        return Ok(redirect("/"));
    };
    let project_id = path.into_inner();
    let project = state
        .catalogue
        .project_details(&token, &project_id)
        .await
        .map_err(|err| {
            error!(%project_id, error = %err, "project detail failed");
            PageError::internal("Failed to fetch project details")
        })?;
    let rulesets = state
        .rulesets
        .list_project_rulesets(&project_id)
        .await
        .map_err(|err| {
            error!(%project_id, error = %err, "project rulesets failed");
            PageError::internal("Failed to fetch project rulesets")
        })?;
    if rulesets.skipped > 0 {
        warn!(%project_id, skipped = rulesets.skipped, "skipped undecodable rulesets");
    }
    views::respond(views::project_detail(&user, &project, &rulesets.items))
}
