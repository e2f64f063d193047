//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_http::Request;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};
use mockable::DefaultClock;
use serde_json::json;

use super::session::{SESSION_COOKIE_NAME, SessionContext};
use super::state::HttpState;
use crate::Trace;
use crate::domain::ports::{
    CollectionPath, DocumentStore, MockIdentityProvider, MockProjectCatalogue,
};
use crate::domain::{ApiResult, AppCredentials, AuthBridge, RulesetService, User, UserId};
use crate::outbound::persistence::MemoryDocumentStore;

/// Route that signs the [`test_user`] in.
pub const SIGN_IN_PATH: &str = "/__test/sign-in";

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per invocation and disables the `Secure` flag for
/// local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by a response, if any.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
}

pub fn test_user() -> User {
    User::new(
        UserId::new("u-1").expect("valid user id"),
        "Ada Lovelace",
        "ada@example.com",
    )
}

/// Doubles wired into [`http_state`]. Defaults carry no expectations.
pub struct StateParts {
    pub identity: MockIdentityProvider,
    pub catalogue: MockProjectCatalogue,
    pub store: Arc<MemoryDocumentStore>,
    pub credentials: Option<AppCredentials>,
}

impl Default for StateParts {
    fn default() -> Self {
        Self {
            identity: MockIdentityProvider::new(),
            catalogue: MockProjectCatalogue::new(),
            store: Arc::new(MemoryDocumentStore::new()),
            credentials: AppCredentials::from_parts(Some("app-id"), Some("app-secret")),
        }
    }
}

pub fn http_state(parts: StateParts) -> web::Data<HttpState> {
    let clock = Arc::new(DefaultClock);
    let auth = AuthBridge::new(
        Arc::new(parts.identity),
        parts.store.clone(),
        parts.credentials,
        clock.clone(),
    );
    let rulesets = RulesetService::new(parts.store, clock);
    web::Data::new(HttpState::new(auth, rulesets, Arc::new(parts.catalogue)))
}

/// Store a bearer token for the [`test_user`].
pub async fn store_token(store: &MemoryDocumentStore, token: &str) {
    let user = test_user();
    store
        .set(
            &CollectionPath::user_tokens(),
            user.id().as_ref(),
            json!({
                "speckleToken": token,
                "userId": user.id().as_ref(),
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z",
            }),
        )
        .await
        .expect("token stored");
}

async fn sign_in_handler(session: SessionContext) -> ApiResult<HttpResponse> {
    session.persist_user(&test_user())?;
    Ok(HttpResponse::NoContent().finish())
}

/// Full route table plus [`SIGN_IN_PATH`], wrapped like production.
pub fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(test_session_middleware())
        .wrap(Trace)
        .route(SIGN_IN_PATH, web::get().to(sign_in_handler))
        .configure(super::configure)
}

/// Sign the [`test_user`] in and return the session cookie.
pub async fn sign_in<S>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, test::TestRequest::get().uri(SIGN_IN_PATH).to_request()).await;
    session_cookie(&res).expect("sign-in sets a session cookie")
}

/// Response body as UTF-8 text.
pub async fn body_text(res: ServiceResponse) -> String {
    let body = test::read_body(res).await;
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

/// `Location` header of a redirect.
pub fn location(res: &ServiceResponse) -> Option<&str> {
    res.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|value| value.to_str().ok())
}
