use axum::{
    http::HeaderMap,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::GIT_COMMIT_HASH;

#[derive(ToSchema, Serialize)]
pub struct Health {
    name: &'static str,
    version: &'static str,
    build: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = Health, content_type = "application/json"),
    ),
    tag = "health"
)]
// axum handler for health
pub async fn health() -> impl IntoResponse {
    let body = Json(Health {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        build: GIT_COMMIT_HASH,
    });

    let short_hash = if GIT_COMMIT_HASH.len() > 7 {
        &GIT_COMMIT_HASH[0..7]
    } else {
        ""
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        "X-App",
        format!(
            "{}:{}:{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            short_hash
        )
        .parse()
        .unwrap(),
    );

    (headers, body)
}
