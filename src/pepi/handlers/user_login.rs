use crate::auth::{AuthError, Authenticator};
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserLogin {
    email: String,
    password: String,
}

#[derive(ToSchema, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub token: String,
    pub refresh_token: String,
}

#[utoipa::path(
    post,
    path = "/user/login",
    responses(
        (status = 200, description = "Login successful", body = SessionResponse, content_type = "application/json"),
        (status = 401, description = "Unauthorized"),
    ),
    tag = "login"
)]
#[instrument(skip_all)]
pub async fn login(
    authenticator: Extension<Arc<Authenticator>>,
    payload: Option<Json<UserLogin>>,
) -> Response {
    let user: UserLogin = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match authenticator.login(&user.email, &user.password).await {
        Ok(tokens) => {
            debug!("Login successful");

            (
                StatusCode::OK,
                Json(SessionResponse {
                    id: tokens.identity.to_string(),
                    token: tokens.access_token,
                    refresh_token: tokens.refresh_token,
                }),
            )
                .into_response()
        }

        Err(AuthError::Unauthorized) => {
            (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()).into_response()
        }

        Err(AuthError::Internal(e)) => {
            error!("Error during login: {:?}", e);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
                .into_response()
        }
    }
}
