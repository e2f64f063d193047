//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie session carries three identity fields and, during login, the
//! pending challenge id. [`CurrentUser`] rebuilds the identity once per
//! request and caches it in the request extensions.

use actix_session::{Session, SessionExt as _};
use actix_web::{FromRequest, HttpMessage as _, HttpRequest, dev::Payload};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::{ChallengeId, Error, User, UserId};

/// Name of the signed cookie carrying the session.
pub const SESSION_COOKIE_NAME: &str = "speckle_session";

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const USER_NAME_KEY: &str = "user_name";
pub(crate) const USER_EMAIL_KEY: &str = "user_email";
pub(crate) const CHALLENGE_KEY: &str = "speckle_challenge_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated identity in the session cookie.
    pub fn persist_user(&self, user: &User) -> Result<(), Error> {
        let insert = |key: &str, value: &str| {
            self.0.insert(key, value).map_err(|error| {
                warn!(%error, key, "failed to write session");
                Error::internal("Failed to save session")
            })
        };
        insert(USER_ID_KEY, user.id().as_ref())?;
        insert(USER_NAME_KEY, user.name())?;
        insert(USER_EMAIL_KEY, user.email())
    }

    /// Identity stored in the session, or `None` unless all fields decode.
    pub fn user(&self) -> Option<User> {
        let id = self.read(USER_ID_KEY)?;
        let name = self.read(USER_NAME_KEY)?;
        let email = self.read(USER_EMAIL_KEY)?;
        match UserId::new(id) {
            Ok(id) => Some(User::new(id, name, email)),
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                None
            }
        }
    }

    /// Remember the challenge issued by `/auth/init`.
    pub fn store_challenge(&self, challenge: &ChallengeId) -> Result<(), Error> {
        self.0.insert(CHALLENGE_KEY, challenge.as_str()).map_err(|error| {
            warn!(%error, "failed to store challenge");
            Error::internal("Failed to save session")
        })
    }

    /// Remove and return the pending challenge. A second call yields `None`.
    pub fn take_challenge(&self) -> Option<ChallengeId> {
        match self.0.remove_as::<String>(CHALLENGE_KEY) {
            Some(Ok(value)) => ChallengeId::from_stored(value),
            Some(Err(raw)) => {
                warn!(len = raw.len(), "undecodable challenge in session");
                None
            }
            None => None,
        }
    }

    /// Drop every session entry and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.0.get::<String>(key) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, key, "failed to read session");
                None
            }
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Identity resolved from the session for the current request.
///
/// Anonymous requests extract as `CurrentUser(None)`; the extractor never
/// fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(Option<User>);

impl CurrentUser {
    /// Signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// Consume the extractor, yielding the user.
    pub fn into_user(self) -> Option<User> {
        self.0
    }

    fn resolve(req: &HttpRequest) -> Self {
        if let Some(cached) = req.extensions().get::<CurrentUser>() {
            return cached.clone();
        }
        let resolved = Self(SessionContext::new(req.get_session()).user());
        req.extensions_mut().insert(resolved.clone());
        resolved
    }
}

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::resolve(req)))
    }
}
