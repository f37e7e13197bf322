//! HTTP API for the hangar server.

pub mod auth;
pub mod drone_types;
pub mod drones;
pub mod error;
pub mod import;
pub mod manufacturers;
pub mod parts;
pub mod practice_days;
pub mod repairs;
mod routes;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub fn routes(state: Arc<AppState>) -> Router {
    routes::create_router(state)
}

#[cfg(test)]
mod tests;
