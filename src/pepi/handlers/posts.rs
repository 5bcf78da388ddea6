use crate::pepi::handlers::AuthenticatedUser;
use crate::pepi::store::PostStore;
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

pub const MAX_POST_LENGTH: usize = 140;

const DISALLOWED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

#[derive(ToSchema, Deserialize)]
pub struct NewPost {
    body: String,
}

/// Replace disallowed words with `****`, case-insensitively. Whitespace is
/// normalized to single spaces.
#[must_use]
pub fn clean_body(body: &str) -> String {
    body.split_whitespace()
        .map(|word| {
            if DISALLOWED_WORDS.contains(&word.to_lowercase().as_str()) {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[utoipa::path(
    post,
    path = "/posts",
    responses(
        (status = 201, description = "Post created", body = crate::pepi::store::Post, content_type = "application/json"),
        (status = 400, description = "Post is too long"),
        (status = 401, description = "Unauthorized"),
    ),
    tag = "posts"
)]
#[instrument(skip_all)]
pub async fn create(
    AuthenticatedUser(user_id): AuthenticatedUser,
    posts: Extension<Arc<dyn PostStore>>,
    payload: Option<Json<NewPost>>,
) -> Response {
    let post: NewPost = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if post.body.chars().count() > MAX_POST_LENGTH {
        return (StatusCode::BAD_REQUEST, "Post is too long".to_string()).into_response();
    }

    let body = clean_body(&post.body);

    match posts.create_post(user_id, &body).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),

        Err(e) => {
            error!("Error creating post: {:?}", e);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/posts",
    responses(
        (status = 200, description = "All posts, oldest first", body = [crate::pepi::store::Post], content_type = "application/json"),
    ),
    tag = "posts"
)]
pub async fn list(posts: Extension<Arc<dyn PostStore>>) -> Response {
    match posts.posts().await {
        Ok(all) => (StatusCode::OK, Json(all)).into_response(),

        Err(e) => {
            error!("Error listing posts: {:?}", e);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(
        ("id" = String, Path, description = "Post id"),
    ),
    responses(
        (status = 200, description = "The post", body = crate::pepi::store::Post, content_type = "application/json"),
        (status = 404, description = "Post not found"),
    ),
    tag = "posts"
)]
pub async fn get_by_id(posts: Extension<Arc<dyn PostStore>>, Path(id): Path<String>) -> Response {
    let Ok(id) = id.parse::<Uuid>() else {
        return (StatusCode::NOT_FOUND, "Post not found".to_string()).into_response();
    };

    match posts.post(id).await {
        Ok(Some(post)) => (StatusCode::OK, Json(post)).into_response(),

        Ok(None) => (StatusCode::NOT_FOUND, "Post not found".to_string()).into_response(),

        Err(e) => {
            error!("Error fetching post: {:?}", e);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_body_replaces_disallowed_words() {
        assert_eq!(
            clean_body("This is a kerfuffle opinion I need to share"),
            "This is a **** opinion I need to share"
        );
        assert_eq!(clean_body("Sharbert!? No, just sharbert"), "Sharbert!? No, just ****");
        assert_eq!(clean_body("FORNAX fornax Fornax"), "**** **** ****");
    }

    #[test]
    fn test_clean_body_leaves_clean_text_alone() {
        assert_eq!(clean_body("nothing to see here"), "nothing to see here");
    }

    #[test]
    fn test_clean_body_normalizes_whitespace() {
        assert_eq!(clean_body("spaced   out\twords"), "spaced out words");
    }
}
