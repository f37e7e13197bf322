//! Drone type endpoints.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use hangar_core::{CreateDroneType, DroneType, DroneTypeUpdate};

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::persistence::drone_types;
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<DroneType>>> {
    let types = drone_types::list(&state.db, user_id).await?;
    Ok(Json(types))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DroneType>> {
    let drone_type = drone_types::get(&state.db, user_id, id).await?;
    Ok(Json(drone_type))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CreateDroneType>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let id = drone_types::create(&state.db, user_id, &req).await?;
    info!(user_id, type_id = id, "Drone type created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "drone type created" })),
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<DroneTypeUpdate>,
) -> ApiResult<Json<serde_json::Value>> {
    drone_types::update(&state.db, user_id, id, &req).await?;
    Ok(Json(json!({ "message": "drone type updated" })))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    drone_types::delete(&state.db, user_id, id).await?;
    Ok(Json(json!({ "message": "drone type deleted" })))
}
