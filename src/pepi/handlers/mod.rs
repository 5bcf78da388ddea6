pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

pub mod metrics;
pub mod posts;

// common functions for the handlers
use crate::auth::{AuthError, Authenticator};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use regex::Regex;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// The identity resolved from a request's bearer token; lives only for the
/// duration of that request. Extracting it is the authorization gate: any
/// failure answers `401 Unauthorized` before the handler runs.
pub struct AuthenticatedUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(authenticator) = parts.extensions.get::<Arc<Authenticator>>() else {
            error!("authenticator extension missing");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"));
        };

        match authenticator.authorize(&parts.headers) {
            Ok(identity) => Ok(Self(identity)),
            Err(AuthError::Unauthorized) => Err((StatusCode::UNAUTHORIZED, "Unauthorized")),
            Err(AuthError::Internal(e)) => {
                error!("authorization failed: {e:?}");
                Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
            }
        }
    }
}
