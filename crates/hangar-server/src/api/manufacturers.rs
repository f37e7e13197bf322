//! Manufacturer endpoints.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use hangar_core::{CreateManufacturer, Manufacturer, ManufacturerUpdate};

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::persistence::manufacturers;
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Manufacturer>>> {
    let manufacturers = manufacturers::list(&state.db, user_id).await?;
    Ok(Json(manufacturers))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Manufacturer>> {
    let manufacturer = manufacturers::get(&state.db, user_id, id).await?;
    Ok(Json(manufacturer))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CreateManufacturer>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let id = manufacturers::create(&state.db, user_id, &req).await?;
    info!(user_id, manufacturer_id = id, "Manufacturer created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "manufacturer created" })),
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<ManufacturerUpdate>,
) -> ApiResult<Json<serde_json::Value>> {
    manufacturers::update(&state.db, user_id, id, &req).await?;
    Ok(Json(json!({ "message": "manufacturer updated" })))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    manufacturers::delete(&state.db, user_id, id).await?;
    Ok(Json(json!({ "message": "manufacturer deleted" })))
}
