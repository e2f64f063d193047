//! Speckle login handlers.
//!
//! ```text
//! GET /auth/init                    -> {"challengeId","authUrl","appId"}
//! GET /auth/callback?access_code=   -> 302 /projects
//! GET /logout                       -> 302 /
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use tracing::warn;

use crate::domain::{AccessCode, ApiResult, AuthError, AuthorizationRequest, Error};
use crate::inbound::http::error::{ErrorBody, PageError, PageResult};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::redirect;

/// Start a login: remember a fresh challenge and return the approval URL.
#[utoipa::path(
    get,
    path = "/auth/init",
    responses(
        (status = 200, description = "Challenge issued", body = AuthorizationRequest),
        (status = 500, description = "App credentials missing", body = ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "authInit"
)]
#[get("/auth/init")]
pub async fn init(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AuthorizationRequest>> {
    let request = state.auth.begin().map_err(|err| {
        warn!(error = %err, "cannot start speckle login");
        Error::internal(err.to_string())
    })?;
    session.store_challenge(&request.challenge_id)?;
    Ok(web::Json(request))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub access_code: Option<String>,
}

/// Finish a login. The stored challenge is consumed even when the exchange fails.
#[get("/auth/callback")]
pub async fn callback(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CallbackQuery>,
) -> PageResult {
    let challenge = session.take_challenge();
    let code = AccessCode::parse(query.access_code.as_deref());
    let user = state
        .auth
        .complete(code, challenge)
        .await
        .map_err(callback_failure)?;
    session
        .persist_user(&user)
        .map_err(|err| PageError::internal(err.message()))?;
    Ok(redirect("/projects"))
}

fn callback_failure(err: AuthError) -> PageError {
    warn!(error = ?err, "speckle login failed");
    match err {
        AuthError::MissingCallbackParameters => PageError::bad_request(err.to_string()),
        AuthError::TokenExchange(_) | AuthError::ProfileFetch(_) => {
            PageError::upstream(err.upstream_status(), err.to_string())
        }
        _ => PageError::internal(err.to_string()),
    }
}

#[get("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    redirect("/")
}
