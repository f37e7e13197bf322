//! Drone endpoints.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use hangar_core::{CreateDrone, Drone, DroneUpdate};

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::persistence::drones;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DroneFilter {
    pub type_id: Option<i64>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(filter): Query<DroneFilter>,
) -> ApiResult<Json<Vec<Drone>>> {
    let drones = drones::list(&state.db, user_id, filter.type_id).await?;
    Ok(Json(drones))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Drone>> {
    let drone = drones::get(&state.db, user_id, id).await?;
    Ok(Json(drone))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CreateDrone>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let id = drones::create(&state.db, user_id, &req).await?;
    info!(user_id, drone_id = id, "Drone created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "drone created" })),
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<DroneUpdate>,
) -> ApiResult<Json<serde_json::Value>> {
    drones::update(&state.db, user_id, id, &req).await?;
    Ok(Json(json!({ "message": "drone updated" })))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    drones::delete(&state.db, user_id, id).await?;
    info!(user_id, drone_id = id, "Drone deleted");
    Ok(Json(json!({ "message": "drone deleted" })))
}
