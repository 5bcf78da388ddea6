//! Credential-and-token core: proves a client's identity from a submitted
//! credential, issues the access/refresh token pair, and resolves the
//! identity bound to an inbound bearer token.
//!
//! Every component here is stateless with respect to request handling; the
//! only suspension point is the credential lookup, which belongs to the
//! [`CredentialStore`] collaborator.

pub mod bearer;
pub mod password;
pub mod refresh;
pub mod token;

use async_trait::async_trait;
use axum::http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

/// What the user-storage collaborator hands back for an identifier.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub id: Uuid,
    pub password_hash: String,
}

/// Lookup interface consumed at login time.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn credentials_for(&self, email: &str) -> anyhow::Result<Option<StoredCredentials>>;
}

/// Identity plus the token pair handed to a freshly authenticated client.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub identity: Uuid,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Every policy rejection collapses into this one opaque outcome; the
    /// cause is logged internally and never reaches the client.
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Composes verifier, codec and generator into the two operations the HTTP
/// layer calls: `login` and `authorize`.
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    secret: SecretString,
    token_ttl: Duration,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("secret", &"***")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl Authenticator {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, secret: SecretString, token_ttl: Duration) -> Self {
        Self {
            store,
            secret,
            token_ttl,
        }
    }

    /// Exchange an identifier and credential for a token pair.
    ///
    /// An unknown identifier and a wrong credential are indistinguishable
    /// to the caller: both come back as [`AuthError::Unauthorized`].
    ///
    /// # Errors
    ///
    /// `Unauthorized` for any credential failure; `Internal` when the
    /// stored digest is unusable or token material cannot be produced.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, AuthError> {
        let Some(stored) = self.store.credentials_for(email).await? else {
            debug!("login rejected: unknown identifier");
            return Err(AuthError::Unauthorized);
        };

        let matches = password::verify(password, &stored.password_hash).map_err(|e| {
            error!("stored digest unusable: {e}");
            AuthError::Internal(e.into())
        })?;

        if !matches {
            debug!("login rejected: credential mismatch");
            return Err(AuthError::Unauthorized);
        }

        let ttl = i64::try_from(self.token_ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = token::AccessTokenClaims::new(stored.id, now_unix_seconds(), ttl)
            .map_err(|e| AuthError::Internal(e.into()))?;

        let access_token = token::sign_hs256(self.secret.expose_secret().as_bytes(), &claims)
            .map_err(|e| AuthError::Internal(e.into()))?;

        let refresh_token = refresh::new_refresh_token().map_err(|e| {
            error!("refresh token generation failed: {e}");
            AuthError::Internal(e.into())
        })?;

        Ok(SessionTokens {
            identity: stored.id,
            access_token,
            refresh_token,
        })
    }

    /// Resolve the identity bound to the request's bearer token.
    ///
    /// Fails closed: a missing or malformed header, a forged or expired
    /// token, or an unparseable subject all come back as `Unauthorized`.
    /// Side-effect free; repeated calls with the same valid token return
    /// the same identity until expiry.
    ///
    /// # Errors
    ///
    /// `Unauthorized` on any of the above.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        let bearer = bearer::extract_bearer(headers).map_err(|e| {
            debug!("bearer extraction failed: {e}");
            AuthError::Unauthorized
        })?;

        let claims = token::verify_hs256(
            bearer,
            self.secret.expose_secret().as_bytes(),
            now_unix_seconds(),
        )
        .map_err(|e| {
            if e.is_rejection() {
                debug!("access token rejected: {e}");
            } else {
                error!("malformed access token: {e}");
            }
            AuthError::Unauthorized
        })?;

        claims.subject().map_err(|e| {
            error!("access token subject unusable: {e}");
            AuthError::Unauthorized
        })
    }
}

pub(crate) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapStore(HashMap<String, StoredCredentials>);

    #[async_trait]
    impl CredentialStore for MapStore {
        async fn credentials_for(
            &self,
            email: &str,
        ) -> anyhow::Result<Option<StoredCredentials>> {
            Ok(self.0.get(email).cloned())
        }
    }

    fn authenticator_with_user(email: &str, password: &str) -> (Authenticator, Uuid) {
        let id = Uuid::new_v4();
        let mut users = HashMap::new();
        users.insert(
            email.to_string(),
            StoredCredentials {
                id,
                password_hash: password::hash(password).unwrap(),
            },
        );

        let authenticator = Authenticator::new(
            Arc::new(MapStore(users)),
            SecretString::from("integration-secret-0123456789abcdef".to_string()),
            Duration::from_secs(3600),
        );

        (authenticator, id)
    }

    #[tokio::test]
    async fn login_then_authorize_round_trip() {
        let (auth, id) = authenticator_with_user("u@x.com", "hunter2hunter2");

        let tokens = auth.login("u@x.com", "hunter2hunter2").await.unwrap();
        assert_eq!(tokens.identity, id);
        assert_eq!(tokens.refresh_token.len(), refresh::REFRESH_TOKEN_BYTES * 2);

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", tokens.access_token).parse().unwrap(),
        );

        assert_eq!(auth.authorize(&headers).unwrap(), id);
        // Idempotent: same token resolves to the same identity again.
        assert_eq!(auth.authorize(&headers).unwrap(), id);
    }

    #[tokio::test]
    async fn unknown_identifier_and_wrong_credential_are_indistinguishable() {
        let (auth, _) = authenticator_with_user("u@x.com", "hunter2hunter2");

        let unknown = auth.login("nobody@x.com", "hunter2hunter2").await;
        let mismatch = auth.login("u@x.com", "wrong-password").await;

        let unknown = unknown.unwrap_err();
        let mismatch = mismatch.unwrap_err();
        assert!(matches!(unknown, AuthError::Unauthorized));
        assert!(matches!(mismatch, AuthError::Unauthorized));
        assert_eq!(unknown.to_string(), mismatch.to_string());
    }

    #[tokio::test]
    async fn malformed_stored_digest_is_internal() {
        let mut users = HashMap::new();
        users.insert(
            "u@x.com".to_string(),
            StoredCredentials {
                id: Uuid::new_v4(),
                password_hash: "garbage".to_string(),
            },
        );
        let auth = Authenticator::new(
            Arc::new(MapStore(users)),
            SecretString::from("integration-secret-0123456789abcdef".to_string()),
            Duration::from_secs(3600),
        );

        assert!(matches!(
            auth.login("u@x.com", "whatever").await,
            Err(AuthError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn authorize_fails_closed() {
        let (auth, id) = authenticator_with_user("u@x.com", "hunter2hunter2");

        // No header at all.
        assert!(matches!(
            auth.authorize(&HeaderMap::new()),
            Err(AuthError::Unauthorized)
        ));

        // Wrong scheme.
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Basic dXNlcjpwYXNz".parse().unwrap(),
        );
        assert!(matches!(
            auth.authorize(&headers),
            Err(AuthError::Unauthorized)
        ));

        // Expired token signed with the right secret.
        let claims = token::AccessTokenClaims {
            iss: token::ISSUER.to_string(),
            sub: id.to_string(),
            iat: now_unix_seconds() - 7200,
            exp: now_unix_seconds() - 3600,
        };
        let expired = token::sign_hs256(b"integration-secret-0123456789abcdef", &claims).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {expired}").parse().unwrap(),
        );
        assert!(matches!(
            auth.authorize(&headers),
            Err(AuthError::Unauthorized)
        ));

        // Token signed with a different secret.
        let claims = token::AccessTokenClaims::new(id, now_unix_seconds(), 3600).unwrap();
        let forged = token::sign_hs256(b"some-other-secret-0123456789abcd", &claims).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {forged}").parse().unwrap(),
        );
        assert!(matches!(
            auth.authorize(&headers),
            Err(AuthError::Unauthorized)
        ));
    }
}
