use crate::{
    auth::Authenticator,
    cli::globals::GlobalArgs,
    pepi::handlers::metrics::{self, HitCounter},
    pepi::store::{PgStore, PostStore, UserStore},
};
use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use utoipa::OpenApi;

pub mod handlers;
pub mod store;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::user_register::register,
        handlers::user_login::login,
        handlers::posts::create,
        handlers::posts::list,
        handlers::posts::get_by_id,
    ),
    components(schemas(
        handlers::health::Health,
        handlers::user_register::UserRegister,
        handlers::user_login::UserLogin,
        handlers::user_login::SessionResponse,
        handlers::posts::NewPost,
        store::User,
        store::Post,
    )),
    tags(
        (name = "pepi", description = "Microblog with token authentication API")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Assemble the application router around injected collaborators. Pure;
/// the integration tests drive it with in-memory stores.
#[must_use]
pub fn router(
    authenticator: Arc<Authenticator>,
    user_store: Arc<dyn UserStore>,
    post_store: Arc<dyn PostStore>,
    hits: HitCounter,
) -> Router {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/", get(|| async { "🐦" }))
        .route("/user/register", post(handlers::register))
        .route("/user/login", post(handlers::login))
        .route(
            "/posts",
            get(handlers::posts::list).post(handlers::posts::create),
        )
        .route("/posts/:id", get(handlers::posts::get_by_id))
        .route("/admin/metrics", get(metrics::metrics))
        .route("/admin/reset", post(metrics::reset))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(hits.clone()))
                .layer(middleware::from_fn(metrics::count_hits))
                .layer(Extension(authenticator))
                .layer(Extension(user_store))
                .layer(Extension(post_store)),
        )
        .route("/health", get(handlers::health).options(handlers::health))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, globals: &GlobalArgs) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PgStore::new(pool));
    store.ensure_schema().await?;

    let authenticator = Arc::new(Authenticator::new(
        store.clone(),
        globals.token_secret.clone(),
        Duration::from_secs(globals.token_ttl_seconds),
    ));

    let app = router(
        authenticator,
        store.clone(),
        store,
        HitCounter::default(),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
