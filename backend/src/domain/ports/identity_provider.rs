//! Port for the Speckle identity endpoints used by the login flow.

use async_trait::async_trait;

use crate::domain::{AccessCode, AppCredentials, BearerToken, ChallengeId, TokenGrant, User};

use super::define_port_error;

define_port_error! {
    /// Failures raised while exchanging codes or fetching the active user.
    pub enum IdentityProviderError {
        /// The token endpoint was unreachable or answered with a non-200 status.
        TokenExchange { status: Option<u16>, message: String } =>
            "token exchange failed: {message}",
        /// The token endpoint answered 200 with an undecodable body.
        TokenDecode { message: String } => "token response could not be decoded: {message}",
        /// The profile query was unreachable or answered with a non-200 status.
        ProfileFetch { status: Option<u16>, message: String } =>
            "profile fetch failed: {message}",
        /// The profile query answered 200 with an undecodable body.
        ProfileDecode { message: String } => "profile response could not be decoded: {message}",
    }
}

impl IdentityProviderError {
    /// Upstream HTTP status when the platform answered with a non-200 code.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::TokenExchange { status, .. } | Self::ProfileFetch { status, .. } => *status,
            Self::TokenDecode { .. } | Self::ProfileDecode { .. } => None,
        }
    }
}

/// Identity operations of the Speckle platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser visits to approve the application for `challenge`.
    fn authorization_url(&self, app_id: &str, challenge: &ChallengeId) -> String;

    /// Exchange an access code for a bearer token.
    async fn exchange_code(
        &self,
        credentials: &AppCredentials,
        code: &AccessCode,
        challenge: &ChallengeId,
    ) -> Result<TokenGrant, IdentityProviderError>;

    /// Fetch the profile of the token's owner.
    async fn active_user(&self, token: &BearerToken) -> Result<User, IdentityProviderError>;
}
