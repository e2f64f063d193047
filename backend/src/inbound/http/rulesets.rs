//! Ruleset pages and the ruleset delete endpoint.
//!
//! ```text
//! GET    /rulesets                 list
//! GET    /rulesets/new?project_id= new form
//! GET    /rulesets/{id}/edit       edit form with rules
//! POST   /rulesets                 create -> 302 /rulesets
//! POST   /rulesets/{id}            update -> 302 /rulesets
//! DELETE /api/rulesets/{id}        {"message"}
//! ```

use actix_web::{delete, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::domain::ports::DocumentStoreError;
use crate::domain::{ApiResult, Error, RulesetDraft};
use crate::inbound::http::error::{ErrorBody, PageError, PageResult};
use crate::inbound::http::forms::RulesetForm;
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{self, redirect};

/// Success payload of the JSON mutation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    #[schema(example = "Ruleset deleted successfully")]
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn ruleset_draft(
    form: Result<web::Form<RulesetForm>, actix_web::Error>,
) -> Result<RulesetDraft, PageError> {
    form.map_err(|err| err.to_string())
        .and_then(|form| RulesetDraft::try_from(form.into_inner()).map_err(|err| err.to_string()))
        .map_err(|reason| {
            warn!(%reason, "rejected ruleset form");
            PageError::bad_request("Invalid ruleset data")
        })
}

#[get("/rulesets")]
pub async fn list(state: web::Data<HttpState>, current: CurrentUser) -> PageResult {
    let Some(user) = current.into_user() else {
        return Ok(redirect("/"));
    };
    let listing = state.rulesets.list_rulesets().await.map_err(|err| {
        error!(error = %err, "ruleset listing failed");
        PageError::internal("Failed to fetch rulesets")
    })?;
    if listing.skipped > 0 {
        warn!(skipped = listing.skipped, "skipped undecodable rulesets");
    }
    views::respond(views::rulesets(&user, &listing.items))
}

#[derive(Debug, Deserialize)]
pub struct NewRulesetQuery {
    pub project_id: Option<String>,
}

#[get("/rulesets/new")]
pub async fn new_form(current: CurrentUser, query: web::Query<NewRulesetQuery>) -> PageResult {
    let Some(user) = current.into_user() else {
        return Ok(redirect("/"));
    };
    views::respond(views::new_ruleset_form(&user, query.project_id.as_deref()))
}

#[get("/rulesets/{id}/edit")]
pub async fn edit_form(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<String>,
) -> PageResult {
    let Some(user) = current.into_user() else {
        return Ok(redirect("/"));
    };
    let id = path.into_inner();
    let fetch_failed = |err: DocumentStoreError| {
        error!(ruleset_id = %id, error = %err, "ruleset fetch failed");
        PageError::internal("Failed to fetch ruleset")
    };
    let ruleset = state.rulesets.get_ruleset(&id).await.map_err(fetch_failed)?;
    let rules = state.rulesets.list_rules(&id).await.map_err(fetch_failed)?;
    if rules.skipped > 0 {
        warn!(ruleset_id = %id, skipped = rules.skipped, "skipped undecodable rules");
    }
    views::respond(views::edit_ruleset_form(&user, &ruleset, &rules.items))
}

#[post("/rulesets")]
pub async fn create(
    state: web::Data<HttpState>,
    current: CurrentUser,
    form: Result<web::Form<RulesetForm>, actix_web::Error>,
) -> PageResult {
    if current.user().is_none() {
        return Ok(redirect("/"));
    }
    let draft = ruleset_draft(form)?;
    let ruleset = state.rulesets.create_ruleset(&draft).await.map_err(|err| {
        error!(error = %err, "ruleset create failed");
        PageError::internal("Failed to create ruleset")
    })?;
    info!(ruleset_id = %ruleset.id, "ruleset created");
    Ok(redirect("/rulesets"))
}

#[post("/rulesets/{id}")]
pub async fn update(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<String>,
    form: Result<web::Form<RulesetForm>, actix_web::Error>,
) -> PageResult {
    if current.user().is_none() {
        return Ok(redirect("/"));
    }
    let id = path.into_inner();
    let draft = ruleset_draft(form)?;
    state
        .rulesets
        .update_ruleset(&id, &draft)
        .await
        .map_err(|err| {
            error!(ruleset_id = %id, error = %err, "ruleset update failed");
            PageError::internal("Failed to update ruleset")
        })?;
    Ok(redirect("/rulesets"))
}

/// Delete a ruleset. Its rules are left in place.
#[utoipa::path(
    delete,
    path = "/api/rulesets/{id}",
    params(("id" = String, Path, description = "Ruleset id")),
    responses(
        (status = 200, description = "Ruleset deleted", body = MessageBody),
        (status = 401, description = "No signed-in user", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tags = ["rulesets"],
    operation_id = "deleteRuleset"
)]
#[delete("/api/rulesets/{id}")]
pub async fn delete_ruleset(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageBody>> {
    current
        .user()
        .ok_or_else(|| Error::unauthorized("Unauthorized"))?;
    let id = path.into_inner();
    state.rulesets.delete_ruleset(&id).await.map_err(|err| {
        error!(ruleset_id = %id, kind = err.kind(), error = %err, "ruleset delete failed");
        Error::internal("Failed to delete ruleset")
    })?;
    Ok(web::Json(MessageBody::new("Ruleset deleted successfully")))
}
