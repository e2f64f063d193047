//! Rule pages plus the JSON delete and reorder endpoints.
//!
//! Rules live in the `rules` sub-collection of their ruleset. HTML writes
//! redirect back to the ruleset edit page.

use actix_web::{delete, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::domain::ports::DocumentStoreError;
use crate::domain::{ApiResult, Error, ReorderDirection, Rule, RuleDraft};
use crate::inbound::http::error::{ErrorBody, PageError, PageResult};
use crate::inbound::http::forms::rule_draft_from_pairs;
use crate::inbound::http::rulesets::MessageBody;
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{self, redirect};

type RawForm = Result<web::Form<Vec<(String, String)>>, actix_web::Error>;

fn rule_draft(form: RawForm) -> Result<RuleDraft, PageError> {
    form.map_err(|err| err.to_string())
        .and_then(|form| rule_draft_from_pairs(form.into_inner()).map_err(|err| err.to_string()))
        .map_err(|reason| {
            warn!(%reason, "rejected rule form");
            PageError::bad_request("Invalid rule data")
        })
}

fn edit_page(ruleset_id: &str) -> String {
    format!("/rulesets/{ruleset_id}/edit")
}

#[get("/rulesets/{id}/rules/new")]
pub async fn new_form(current: CurrentUser, path: web::Path<String>) -> PageResult {
    let Some(user) = current.into_user() else {
        return Ok(redirect("/"));
    };
    views::respond(views::rule_form(&user, &path, None))
}

#[get("/rulesets/{id}/rules/{rule_id}/edit")]
pub async fn edit_form(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<(String, String)>,
) -> PageResult {
    let Some(user) = current.into_user() else {
        return Ok(redirect("/"));
    };
    let (ruleset_id, rule_id) = path.into_inner();
    let rule = state
        .rulesets
        .get_rule(&ruleset_id, &rule_id)
        .await
        .map_err(|err| {
            error!(%ruleset_id, %rule_id, error = %err, "rule fetch failed");
            PageError::internal("Failed to fetch rule")
        })?;
    views::respond(views::rule_form(&user, &ruleset_id, Some(&rule)))
}

#[post("/rulesets/{id}/rules")]
pub async fn create(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<String>,
    form: RawForm,
) -> PageResult {
    if current.user().is_none() {
        return Ok(redirect("/"));
    }
    let ruleset_id = path.into_inner();
    let draft = rule_draft(form)?;
    let rule = state
        .rulesets
        .create_rule(&ruleset_id, &draft)
        .await
        .map_err(|err| {
            error!(%ruleset_id, error = %err, "rule create failed");
            PageError::internal("Failed to add rule")
        })?;
    info!(%ruleset_id, rule_id = %rule.id, order = rule.order, "rule created");
    Ok(redirect(&edit_page(&ruleset_id)))
}

#[post("/rulesets/{id}/rules/{rule_id}")]
pub async fn update(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<(String, String)>,
    form: RawForm,
) -> PageResult {
    if current.user().is_none() {
        return Ok(redirect("/"));
    }
    let (ruleset_id, rule_id) = path.into_inner();
    let draft = rule_draft(form)?;
    state
        .rulesets
        .update_rule(&ruleset_id, &rule_id, &draft)
        .await
        .map_err(|err| {
            error!(%ruleset_id, %rule_id, error = %err, "rule update failed");
            PageError::internal("Failed to update rule")
        })?;
    Ok(redirect(&edit_page(&ruleset_id)))
}

#[utoipa::path(
    delete,
    path = "/api/rulesets/{id}/rules/{rule_id}",
    params(
        ("id" = String, Path, description = "Ruleset id"),
        ("rule_id" = String, Path, description = "Rule id")
    ),
    responses(
        (status = 200, description = "Rule deleted", body = MessageBody),
        (status = 401, description = "No signed-in user", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tags = ["rules"],
    operation_id = "deleteRule"
)]
#[delete("/api/rulesets/{id}/rules/{rule_id}")]
pub async fn delete_rule(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<MessageBody>> {
    current
        .user()
        .ok_or_else(|| Error::unauthorized("Unauthorized"))?;
    let (ruleset_id, rule_id) = path.into_inner();
    state
        .rulesets
        .delete_rule(&ruleset_id, &rule_id)
        .await
        .map_err(|err| {
            error!(%ruleset_id, %rule_id, kind = err.kind(), error = %err, "rule delete failed");
            Error::internal("Failed to delete rule")
        })?;
    Ok(web::Json(MessageBody::new("Rule deleted successfully")))
}

#[derive(Debug, Deserialize)]
pub struct ReorderQuery {
    pub direction: Option<String>,
}

/// Rules of the ruleset in their new order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReorderBody {
    #[schema(example = "Rule reordered successfully")]
    pub message: String,
    pub rules: Vec<Rule>,
}

/// Move a rule one slot. Moving past either end leaves the order unchanged.
#[utoipa::path(
    post,
    path = "/api/rulesets/{id}/rules/{rule_id}/reorder",
    params(
        ("id" = String, Path, description = "Ruleset id"),
        ("rule_id" = String, Path, description = "Rule id"),
        ("direction" = String, Query, description = "`up` or `down`")
    ),
    responses(
        (status = 200, description = "Rule moved", body = ReorderBody),
        (status = 400, description = "Unknown direction", body = ErrorBody),
        (status = 401, description = "No signed-in user", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tags = ["rules"],
    operation_id = "reorderRule"
)]
#[post("/api/rulesets/{id}/rules/{rule_id}/reorder")]
pub async fn reorder(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<(String, String)>,
    query: web::Query<ReorderQuery>,
) -> ApiResult<web::Json<ReorderBody>> {
    current
        .user()
        .ok_or_else(|| Error::unauthorized("Unauthorized"))?;
    let direction: ReorderDirection = query
        .direction
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|err| {
            warn!(error = %err, "rejected reorder request");
            Error::invalid_request("Invalid reorder direction")
        })?;
    let (ruleset_id, rule_id) = path.into_inner();
    let rules = state
        .rulesets
        .reorder_rule(&ruleset_id, &rule_id, direction)
        .await
        .map_err(|err: DocumentStoreError| {
            error!(%ruleset_id, %rule_id, kind = err.kind(), error = %err, "rule reorder failed");
            Error::internal("Failed to reorder rule")
        })?;
    Ok(web::Json(ReorderBody {
        message: "Rule reordered successfully".to_owned(),
        rules,
    }))
}
