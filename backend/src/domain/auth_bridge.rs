//! Orchestration of the Speckle challenge login flow.
//!
//! The bridge issues challenges, exchanges returned access codes for bearer
//! tokens, resolves the token owner and persists the token per user. Session
//! storage stays in the inbound adapter.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    CollectionPath, DocumentStore, DocumentStoreError, IdentityProvider, IdentityProviderError,
};
use crate::domain::{
    AccessCode, AppCredentials, AuthorizationRequest, BearerToken, ChallengeId, User, UserId,
    UserToken,
};

/// Failures of the login flow. `Display` yields the message shown to users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// App id or secret missing from configuration.
    #[error("Speckle App ID or Secret not configured")]
    NotConfigured,
    /// Callback lacked the access code or the stored challenge.
    #[error("Missing access code or challenge ID")]
    MissingCallbackParameters,
    /// Token endpoint unreachable or refused the code.
    #[error("Failed to exchange token")]
    TokenExchange(#[source] IdentityProviderError),
    /// Token endpoint answered with an unreadable body.
    #[error("Failed to decode token response")]
    TokenDecode(#[source] IdentityProviderError),
    /// Profile query unreachable or refused.
    #[error("Failed to get user profile")]
    ProfileFetch(#[source] IdentityProviderError),
    /// Profile query answered with an unreadable body.
    #[error("Failed to decode profile response")]
    ProfileDecode(#[source] IdentityProviderError),
    /// Token could not be persisted.
    #[error("Failed to store user token")]
    TokenStore(#[source] DocumentStoreError),
}

impl AuthError {
    /// Status the platform answered with, when it rejected the exchange.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::TokenExchange(source) | Self::ProfileFetch(source) => source.upstream_status(),
            _ => None,
        }
    }
}

impl From<IdentityProviderError> for AuthError {
    fn from(error: IdentityProviderError) -> Self {
        match error {
            IdentityProviderError::TokenExchange { .. } => Self::TokenExchange(error),
            IdentityProviderError::TokenDecode { .. } => Self::TokenDecode(error),
            IdentityProviderError::ProfileFetch { .. } => Self::ProfileFetch(error),
            IdentityProviderError::ProfileDecode { .. } => Self::ProfileDecode(error),
        }
    }
}

/// Login flow over the identity provider and the token collection.
#[derive(Clone)]
pub struct AuthBridge {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    credentials: Option<AppCredentials>,
    clock: Arc<dyn Clock>,
}

impl AuthBridge {
    /// Build the bridge. `credentials` is `None` when the app is unregistered;
    /// every flow step then fails with [`AuthError::NotConfigured`].
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        credentials: Option<AppCredentials>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            store,
            credentials,
            clock,
        }
    }

    /// Issue a fresh challenge and the URL the browser should visit.
    pub fn begin(&self) -> Result<AuthorizationRequest, AuthError> {
        let credentials = self.credentials.as_ref().ok_or(AuthError::NotConfigured)?;
        let challenge_id = ChallengeId::generate();
        let auth_url = self
            .identity
            .authorization_url(credentials.app_id(), &challenge_id);
        Ok(AuthorizationRequest {
            challenge_id,
            auth_url,
            app_id: credentials.app_id().to_owned(),
        })
    }

    /// Finish the flow started by [`Self::begin`].
    ///
    /// Both callback parameters must be present before anything is sent to
    /// the platform. The token is stored under the owner's id; an existing
    /// record keeps its `createdAt`.
    pub async fn complete(
        &self,
        code: Option<AccessCode>,
        challenge: Option<ChallengeId>,
    ) -> Result<User, AuthError> {
        let (Some(code), Some(challenge)) = (code, challenge) else {
            return Err(AuthError::MissingCallbackParameters);
        };
        let credentials = self.credentials.as_ref().ok_or(AuthError::NotConfigured)?;

        let grant = self
            .identity
            .exchange_code(credentials, &code, &challenge)
            .await?;
        let user = self.identity.active_user(&grant.token).await?;
        self.store_token(user.id(), &grant.token)
            .await
            .map_err(AuthError::TokenStore)?;
        info!(user_id = %user.id(), "speckle login completed");
        Ok(user)
    }

    /// Stored bearer token for `user_id`, if one exists.
    pub async fn token_for(
        &self,
        user_id: &UserId,
    ) -> Result<Option<BearerToken>, DocumentStoreError> {
        Ok(self
            .stored_token(user_id)
            .await?
            .map(|record| BearerToken::new(record.speckle_token)))
    }

    async fn stored_token(&self, user_id: &UserId) -> Result<Option<UserToken>, DocumentStoreError> {
        let collection = CollectionPath::user_tokens();
        match self.store.get(&collection, user_id.as_ref()).await {
            Ok(document) => serde_json::from_value(document.fields)
                .map(Some)
                .map_err(|error| {
                    DocumentStoreError::query(format!(
                        "token record for user {user_id} is malformed: {error}"
                    ))
                }),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn store_token(
        &self,
        user_id: &UserId,
        token: &BearerToken,
    ) -> Result<(), DocumentStoreError> {
        let now = self.clock.utc();
        let created_at = match self.stored_token(user_id).await {
            Ok(Some(existing)) => existing.created_at,
            Ok(None) => now,
            Err(error) => {
                debug!(user_id = %user_id, %error, "replacing unreadable token record");
                now
            }
        };
        let record = UserToken {
            speckle_token: token.expose().to_owned(),
            user_id: user_id.clone(),
            created_at,
            updated_at: now,
        };
        let fields = serde_json::to_value(&record).map_err(|error| {
            DocumentStoreError::query(format!("failed to encode token record: {error}"))
        })?;
        self.store
            .set(&CollectionPath::user_tokens(), user_id.as_ref(), fields)
            .await
    }
}

#[cfg(test)]
#[path = "auth_bridge_tests.rs"]
mod tests;
