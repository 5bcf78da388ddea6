use crate::auth::password;
use crate::pepi::handlers::valid_email;
use crate::pepi::store::{StoreError, UserStore};
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

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserRegister {
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/user/register",
    responses(
        (status = 201, description = "Registration successful", body = crate::pepi::store::User, content_type = "application/json"),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "User with the specified email already exists"),
    ),
    tag = "register"
)]
#[instrument(skip_all)]
pub async fn register(
    users: Extension<Arc<dyn UserStore>>,
    payload: Option<Json<UserRegister>>,
) -> Response {
    let user: UserRegister = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if !valid_email(&user.email) {
        debug!("registration rejected: invalid email");

        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    if user.password.chars().count() < MIN_PASSWORD_LENGTH {
        debug!("registration rejected: password too short");

        return (StatusCode::BAD_REQUEST, "Invalid password".to_string()).into_response();
    }

    let digest = match password::hash(&user.password) {
        Ok(digest) => digest,
        Err(e) => {
            error!("Error hashing password: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
                .into_response();
        }
    };

    match users.create_user(&user.email, &digest).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),

        Err(StoreError::Conflict) => {
            debug!("registration rejected: email already registered");

            (StatusCode::CONFLICT, "User already exists".to_string()).into_response()
        }

        Err(StoreError::Other(e)) => {
            error!("Error creating user: {:?}", e);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
                .into_response()
        }
    }
}
