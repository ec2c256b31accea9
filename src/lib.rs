use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod store;

use state::AppState;

pub fn app(state: AppState) -> Router {
    // Everything under /api requires a resolved session
    let session_scoped = Router::new()
        .route("/api/auth/whoami", get(handlers::auth::whoami))
        .merge(practice_routes())
        .merge(admin_routes())
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::session::authenticate,
        ));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(handlers::auth::login))
        .merge(session_scoped)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn practice_routes() -> Router<AppState> {
    use handlers::practice::{badges, dashboard, team};

    Router::new()
        .route(
            "/api/practices/:practice_id/dashboard-stats",
            get(dashboard::dashboard_stats),
        )
        .route(
            "/api/practices/:practice_id/sidebar-badges",
            get(badges::sidebar_badges),
        )
        .route(
            "/api/practices/:practice_id/team-members",
            get(team::list).post(team::create),
        )
        .route(
            "/api/practices/:practice_id/team-members/:id",
            get(team::get).patch(team::update).delete(team::remove),
        )
        .route(
            "/api/practices/:practice_id/team-members/:id/restore",
            post(team::restore),
        )
}

fn admin_routes() -> Router<AppState> {
    use handlers::admin::{practices, users};

    Router::new()
        .route("/api/admin/practices", get(practices::list))
        .route(
            "/api/admin/practices/:practice_id/restore",
            post(practices::restore),
        )
        .route("/api/admin/users", get(users::list))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Praxis API",
            "version": version,
            "description": "Multi-tenant practice management backend",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "/auth/login (public - token acquisition)",
                "whoami": "/api/auth/whoami (session)",
                "practice": "/api/practices/:practice_id/* (session + tenant guard)",
                "admin": "/api/admin/* (super admin)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "store": "ok" }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "data": { "status": "degraded", "timestamp": now, "store_error": e.to_string() }
            })),
        ),
    }
}
