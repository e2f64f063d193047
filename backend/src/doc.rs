//! OpenAPI documentation for the JSON endpoints.
//!
//! HTML pages and the TSV export are not described here. Swagger UI serves
//! this document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{AuthorizationRequest, Condition, ErrorCode, Rule};
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::rules::ReorderBody;
use crate::inbound::http::rulesets::MessageBody;
use crate::inbound::http::session::SESSION_COOKIE_NAME;

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Session cookie issued after GET /auth/callback.",
            ))),
        );
    }
}

/// OpenAPI document for the JSON API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Model checker API",
        description = "Speckle sign-in and ruleset maintenance endpoints."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::init,
        crate::inbound::http::rulesets::delete_ruleset,
        crate::inbound::http::rules::delete_rule,
        crate::inbound::http::rules::reorder,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorBody,
        ErrorCode,
        MessageBody,
        ReorderBody,
        AuthorizationRequest,
        Rule,
        Condition
    )),
    tags(
        (name = "auth", description = "Speckle sign-in"),
        (name = "rulesets", description = "Ruleset maintenance"),
        (name = "rules", description = "Rule maintenance and ranking"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
