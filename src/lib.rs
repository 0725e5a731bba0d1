pub mod claims;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod state;
pub mod users;

use axum::{
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the full application router over the given state.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/claims/schema", get(handlers::claims::schema))
        .route("/api/claims", get(handlers::claims::list).post(handlers::claims::create))
        .route(
            "/api/claims/:id",
            put(handlers::claims::update).delete(handlers::claims::delete),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_auth_middleware,
        ));

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/auth/login", post(handlers::auth::login))
        .merge(protected);

    // Global middleware
    let cfg = config::config();
    if cfg.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if cfg.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "NZG Claims API",
        "version": version,
        "description": "Claims registry backend with dynamic schema handling",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "login": "POST /api/auth/login (public - token acquisition)",
            "auth": "/api/auth/* (protected - session management)",
            "claims": "/api/claims[/:id] (protected)",
            "schema": "/api/claims/schema (protected)",
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "store_error": e.to_string()
            })),
        ),
    }
}
