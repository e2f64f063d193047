//! HTTP inbound adapter: HTML pages, JSON endpoints and the TSV export.
//!
//! [`configure`] registers every application route. Health probes and the
//! session middleware are attached by the binary.

pub mod auth;
pub mod error;
pub mod export;
pub mod forms;
pub mod health;
pub mod home;
pub mod projects;
pub mod rules;
pub mod rulesets;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod views;

use actix_web::web;

/// Register the application routes.
///
/// Handlers expect [`state::HttpState`] in app data and a session middleware
/// wrapping the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::init)
        .service(auth::callback)
        .service(auth::logout)
        .service(home::home)
        // Literal segment before the `{project_id}` matcher.
        .service(projects::search)
        .service(projects::list)
        .service(projects::detail)
        .service(rulesets::list)
        .service(rulesets::new_form)
        .service(rulesets::edit_form)
        .service(rulesets::create)
        .service(rulesets::update)
        .service(rulesets::delete_ruleset)
        .service(rules::new_form)
        .service(rules::edit_form)
        .service(rules::create)
        .service(rules::update)
        .service(rules::delete_rule)
        .service(rules::reorder)
        .service(export::tsv);
}
