//! REST API routes.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::api::{auth, drone_types, drones, import, manufacturers, parts, practice_days, repairs};
use crate::state::AppState;

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Registration and login are the only API routes outside the session.
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/drones", get(drones::list).post(drones::create))
        .route(
            "/api/drones/:id",
            get(drones::get).put(drones::update).delete(drones::delete),
        )
        .route("/api/parts", get(parts::list).post(parts::create))
        .route(
            "/api/parts/:id",
            get(parts::get).put(parts::update).delete(parts::delete),
        )
        .route("/api/repairs", get(repairs::list).post(repairs::create))
        .route(
            "/api/repairs/:id",
            get(repairs::get)
                .put(repairs::update)
                .delete(repairs::delete),
        )
        .route(
            "/api/drone-types",
            get(drone_types::list).post(drone_types::create),
        )
        .route(
            "/api/drone-types/:id",
            get(drone_types::get)
                .put(drone_types::update)
                .delete(drone_types::delete),
        )
        .route(
            "/api/manufacturers",
            get(manufacturers::list).post(manufacturers::create),
        )
        .route(
            "/api/manufacturers/:id",
            get(manufacturers::get)
                .put(manufacturers::update)
                .delete(manufacturers::delete),
        )
        .route(
            "/api/practice-days",
            get(practice_days::list).post(practice_days::create),
        )
        .route(
            "/api/practice-days/:id",
            get(practice_days::get)
                .put(practice_days::update)
                .delete(practice_days::delete),
        )
        .route("/api/migrate/import", post(import::import_snapshot))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/health", get(health))
        .route_service("/", ServeFile::new("static/index.html"))
        .nest_service("/static", ServeDir::new("static"))
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
