//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::Value;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::UpstreamError, StatusCode::INTERNAL_SERVER_ERROR)]
#[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] code: ErrorCode, #[case] status: StatusCode) {
    assert_eq!(status_for(code), status);
    assert_eq!(ResponseError::status_code(&Error::new(code, "x")), status);
}

async fn body_json(response: HttpResponse) -> Value {
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn json_errors_carry_message_code_and_trace_id(expected_trace_id: String) {
    let error = Error::internal("Failed to delete ruleset").with_trace_id(expected_trace_id.clone());
    let response = ResponseError::error_response(&error);

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .expect("trace id header")
        .to_str()
        .expect("ascii header")
        .to_owned();
    assert_eq!(header, expected_trace_id);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to delete ruleset");
    assert_eq!(body["code"], "internal_error");
    assert_eq!(body["traceId"], TRACE_ID);
}

#[rstest]
#[actix_web::test]
async fn json_error_without_trace_id_omits_field_and_header() {
    let response = ResponseError::error_response(&Error::unauthorized("Unauthorized"));
    assert!(response.headers().get(TRACE_ID_HEADER).is_none());

    let body = body_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
    assert!(body.get("traceId").is_none());
}

#[rstest]
fn from_actix_error_is_generic_internal_error() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
}

#[rstest]
#[case(Some(401), StatusCode::UNAUTHORIZED)]
#[case(Some(503), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Some(200), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(Some(99), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(None, StatusCode::INTERNAL_SERVER_ERROR)]
fn upstream_page_errors_reuse_error_statuses(
    #[case] upstream: Option<u16>,
    #[case] expected: StatusCode,
) {
    let error = PageError::upstream(upstream, "Failed to exchange token");
    assert_eq!(ResponseError::status_code(&error), expected);
}

#[rstest]
#[actix_web::test]
async fn page_errors_render_html_with_message() {
    let response = ResponseError::error_response(&PageError::bad_request("Invalid rule data"));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response
        .headers()
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(content_type.starts_with("text/html"), "{content_type}");

    let bytes = to_bytes(response.into_body()).await.expect("body");
    let html = std::str::from_utf8(&bytes).expect("utf8");
    assert!(html.contains("Invalid rule data"));
}
