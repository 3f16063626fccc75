/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use techclub_api::{app::{build_router, AppState}, config::Config};
/// use techclub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig::from_url(&config.database.url)).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler through `State`; the config sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── /health                      # liveness + DB (public)
/// ├── /api/
/// │   ├── /applications            # intake (public) + review (board/admin)
/// │   ├── /auth                    # login, register, password, verify, me
/// │   ├── /users                   # invite registration, profile, score
/// │   ├── /departments             # public
/// │   ├── /board                   # public
/// │   ├── /members                 # board/admin, promotion (admin)
/// │   ├── /events                  # public list, admin writes
/// │   ├── /sponsors                # public list, admin writes
/// │   ├── /leaderboard             # public list, admin writes
/// │   ├── /sessions                # members, attendance (board/admin)
/// │   └── /suggestions             # members post, board/admin read
/// ├── /uploads/*                   # profile pictures
/// └── /*                           # single-page app, index.html fallback
/// ```
///
/// Unknown `/api` paths get a JSON 404 instead of the SPA.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/applications", routes::applications::router(state.clone()))
        .nest("/auth", routes::auth::router(state.clone()))
        .nest("/users", routes::users::router(state.clone()))
        .nest("/departments", routes::departments::router())
        .nest("/board", routes::board::router())
        .nest("/members", routes::members::router(state.clone()))
        .nest("/events", routes::events::router(state.clone()))
        .nest("/sponsors", routes::sponsors::router(state.clone()))
        .nest("/leaderboard", routes::leaderboard::router(state.clone()))
        .nest("/sessions", routes::sessions::router(state.clone()))
        .nest("/suggestions", routes::suggestions::router(state.clone()))
        .fallback(api_not_found);

    let storage = &state.config.storage;
    let spa = ServeDir::new(&storage.static_dir)
        .fallback(ServeFile::new(storage.static_dir.join("index.html")));

    let cors = cors_layer(&state.config.api.cors_origins);
    let security = SecurityHeadersLayer::new(state.config.api.production);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(&storage.uploads_dir))
        .fallback_service(spa)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(security)
        .with_state(state)
}

/// Permissive when the origins include `*`, otherwise an explicit allow-list
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
