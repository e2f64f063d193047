//! Public TSV export addressed by ruleset hash. No session is required.

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, web};
use tracing::{debug, error};

use crate::domain::{export_filename, render_tsv};
use crate::inbound::http::error::{PageError, PageResult};
use crate::inbound::http::state::HttpState;

pub const TSV_CONTENT_TYPE: &str = "text/tab-separated-values; charset=utf-8";

fn export_failed(err: impl std::fmt::Display) -> PageError {
    error!(error = %err, "ruleset export failed");
    PageError::internal("Failed to export ruleset")
}

#[get("/r/{hash}/tsv")]
pub async fn tsv(state: web::Data<HttpState>, path: web::Path<String>) -> PageResult {
    let hash = path.into_inner();
    let Some(ruleset) = state
        .rulesets
        .find_by_export_hash(&hash)
        .await
        .map_err(export_failed)?
    else {
        debug!(%hash, "no ruleset for export hash");
        return Err(PageError::not_found("Ruleset not found"));
    };
    let rules = state
        .rulesets
        .list_rules(&ruleset.id)
        .await
        .map_err(export_failed)?;
    let body = render_tsv(&rules.items).map_err(export_failed)?;

    Ok(HttpResponse::Ok()
        .content_type(TSV_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(export_filename(&ruleset.name))],
        })
        .body(body))
}
