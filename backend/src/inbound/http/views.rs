//! Server-rendered pages.
//!
//! Templates are compiled into the binary and registered once. Every page
//! extends `base.html`, which renders the navigation for the signed-in user.
//! Autoescaping is on for all `.html` templates.

use std::sync::LazyLock;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::{self, ContentType};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::error;

use crate::domain::{Project, ProjectPage, Rule, Ruleset, User, ruleset_hash};
use crate::inbound::http::error::{PageError, PageResult};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../../templates/base.html")),
    ("login.html", include_str!("../../../templates/login.html")),
    ("welcome.html", include_str!("../../../templates/welcome.html")),
    ("projects.html", include_str!("../../../templates/projects.html")),
    (
        "project_detail.html",
        include_str!("../../../templates/project_detail.html"),
    ),
    ("rulesets.html", include_str!("../../../templates/rulesets.html")),
    (
        "ruleset_form.html",
        include_str!("../../../templates/ruleset_form.html"),
    ),
    ("rule_form.html", include_str!("../../../templates/rule_form.html")),
    ("error.html", include_str!("../../../templates/error.html")),
];

static REGISTRY: LazyLock<Result<Tera, String>> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())
        .map_err(|error| describe(&error))?;
    Ok(tera)
});

/// Rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("template registry failed to load: {0}")]
    Registry(String),
    #[error("failed to render {template}: {message}")]
    Render { template: String, message: String },
}

fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Parse every template, surfacing syntax errors at startup.
///
/// # Errors
///
/// Returns [`ViewError::Registry`] when a template fails to compile.
pub fn init() -> Result<(), ViewError> {
    REGISTRY
        .as_ref()
        .map(|_| ())
        .map_err(|message| ViewError::Registry(message.clone()))
}

fn render(template: &str, context: &Context) -> Result<String, ViewError> {
    let tera = REGISTRY
        .as_ref()
        .map_err(|message| ViewError::Registry(message.clone()))?;
    tera.render(template, context)
        .map_err(|error| ViewError::Render {
            template: template.to_owned(),
            message: describe(&error),
        })
}

fn page_context(title: &str, user: Option<&User>) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("user", &user);
    context
}

/// Wrap rendered markup in a `200 OK` HTML response.
pub fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

/// Turn a rendered page into a response, or a 500 page when rendering failed.
pub fn respond(rendered: Result<String, ViewError>) -> PageResult {
    rendered.map(html).map_err(|err| {
        error!(error = %err, "failed to render page");
        PageError::internal("Failed to render page")
    })
}

/// `302 Found` pointing at `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[derive(Serialize)]
struct RulesetRow<'a> {
    #[serde(flatten)]
    ruleset: &'a Ruleset,
    export_url: String,
}

fn ruleset_rows(rulesets: &[Ruleset]) -> Vec<RulesetRow<'_>> {
    rulesets
        .iter()
        .map(|ruleset| RulesetRow {
            ruleset,
            export_url: export_url(ruleset),
        })
        .collect()
}

/// Public, unauthenticated TSV link for a ruleset.
pub fn export_url(ruleset: &Ruleset) -> String {
    format!("/r/{}/tsv", ruleset_hash(&ruleset.project_id, &ruleset.id))
}

pub fn login(user: Option<&User>) -> Result<String, ViewError> {
    render("login.html", &page_context("Welcome", user))
}

pub fn welcome(user: &User) -> Result<String, ViewError> {
    render("welcome.html", &page_context("Welcome", Some(user)))
}

/// Project listing. `next_cursor` is only set when another page exists.
pub fn projects(
    user: &User,
    page: &ProjectPage,
    next_cursor: Option<&str>,
    search: Option<&str>,
) -> Result<String, ViewError> {
    let title = if search.is_some() { "Search Results" } else { "Projects" };
    let mut context = page_context(title, Some(user));
    context.insert("projects", &page.items);
    context.insert("total_count", &page.total_count);
    context.insert("next_cursor", &next_cursor);
    context.insert("search", &search);
    render("projects.html", &context)
}

pub fn project_detail(
    user: &User,
    project: &Project,
    rulesets: &[Ruleset],
) -> Result<String, ViewError> {
    let mut context = page_context(&project.name, Some(user));
    context.insert("project", project);
    context.insert("rulesets", &ruleset_rows(rulesets));
    render("project_detail.html", &context)
}

pub fn rulesets(user: &User, rulesets: &[Ruleset]) -> Result<String, ViewError> {
    let mut context = page_context("Rulesets", Some(user));
    context.insert("rulesets", &ruleset_rows(rulesets));
    render("rulesets.html", &context)
}

/// New ruleset form, optionally pre-filled with a project id.
pub fn new_ruleset_form(user: &User, project_id: Option<&str>) -> Result<String, ViewError> {
    let mut context = page_context("New Ruleset", Some(user));
    context.insert("ruleset", &None::<Ruleset>);
    context.insert("project_id", &project_id.unwrap_or_default());
    context.insert("rules", &Vec::<Rule>::new());
    render("ruleset_form.html", &context)
}

/// Edit form for an existing ruleset with its ranked rules.
pub fn edit_ruleset_form(
    user: &User,
    ruleset: &Ruleset,
    rules: &[Rule],
) -> Result<String, ViewError> {
    let mut context = page_context("Edit Ruleset", Some(user));
    context.insert("ruleset", ruleset);
    context.insert("project_id", &ruleset.project_id);
    context.insert("rules", rules);
    context.insert("export_url", &export_url(ruleset));
    render("ruleset_form.html", &context)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConditionRow<'a> {
    property_name: &'a str,
    predicate: &'a str,
    value: String,
}

/// Rule form. Always renders at least one blank condition row.
pub fn rule_form(user: &User, ruleset_id: &str, rule: Option<&Rule>) -> Result<String, ViewError> {
    let title = if rule.is_some() { "Edit Rule" } else { "New Rule" };
    let mut conditions: Vec<ConditionRow<'_>> = rule
        .map(|rule| {
            rule.conditions
                .iter()
                .map(|condition| ConditionRow {
                    property_name: &condition.property_name,
                    predicate: &condition.predicate,
                    value: condition.value.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();
    if conditions.is_empty() {
        conditions.push(ConditionRow {
            property_name: "",
            predicate: "",
            value: String::new(),
        });
    }
    let mut context = page_context(title, Some(user));
    context.insert("ruleset_id", ruleset_id);
    context.insert("rule", &rule);
    context.insert("conditions", &conditions);
    render("rule_form.html", &context)
}

pub fn error_page(
    status: StatusCode,
    message: &str,
    trace_id: Option<&str>,
) -> Result<String, ViewError> {
    let mut context = page_context("Error", None);
    context.insert("status", &status.as_u16());
    context.insert("error", message);
    context.insert("trace_id", &trace_id);
    render("error.html", &context)
}
