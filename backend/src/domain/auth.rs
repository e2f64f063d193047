//! Primitives for the Speckle authorization challenge flow.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

/// Number of random bytes behind a challenge id.
pub const CHALLENGE_BYTES: usize = 32;

/// One-time random token binding an authorization redirect to the session
/// that started it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeId(String);

impl ChallengeId {
    /// Draw 32 bytes from the OS RNG and encode them as padded URL-safe base64.
    ///
    /// # Examples
    /// ```
    /// use model_checker::domain::ChallengeId;
    ///
    /// let challenge = ChallengeId::generate();
    /// assert_eq!(challenge.as_str().len(), 44);
    /// ```
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; CHALLENGE_BYTES]);
        OsRng.fill_bytes(&mut bytes[..]);
        Self(URL_SAFE.encode(&bytes[..]))
    }

    /// Rehydrate a challenge previously stored in the session.
    pub fn from_stored(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() { None } else { Some(Self(value)) }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChallengeId(..)")
    }
}

/// Access code returned by the platform on the callback redirect.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessCode(Zeroizing<String>);

impl AccessCode {
    /// Wrap a raw query value; blank values yield `None`.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.filter(|value| !value.trim().is_empty())
            .map(|value| Self(Zeroizing::new(value.to_owned())))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCode(..)")
    }
}

/// Opaque Speckle credential authorising GraphQL calls.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

/// Tokens returned by a successful code exchange.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub token: BearerToken,
    pub refresh_token: Option<BearerToken>,
}

/// Registered Speckle application credentials.
#[derive(Clone)]
pub struct AppCredentials {
    app_id: String,
    app_secret: Zeroizing<String>,
}

impl AppCredentials {
    /// Build credentials when both parts are present and non-blank.
    pub fn from_parts(app_id: Option<&str>, app_secret: Option<&str>) -> Option<Self> {
        let app_id = app_id.map(str::trim).filter(|value| !value.is_empty())?;
        let app_secret = app_secret.filter(|value| !value.trim().is_empty())?;
        Some(Self {
            app_id: app_id.to_owned(),
            app_secret: Zeroizing::new(app_secret.to_owned()),
        })
    }

    pub fn app_id(&self) -> &str {
        self.app_id.as_str()
    }

    pub fn app_secret(&self) -> &str {
        self.app_secret.as_str()
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

/// Payload returned by `GET /auth/init`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    #[schema(value_type = String)]
    pub challenge_id: ChallengeId,
    #[schema(example = "https://app.speckle.systems/authn/verify/app/challenge")]
    pub auth_url: String,
    pub app_id: String,
}
