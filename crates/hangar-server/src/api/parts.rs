//! Part endpoints.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use hangar_core::{CreatePart, Part, PartUpdate};

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::persistence::parts;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PartFilter {
    pub drone_id: Option<i64>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(filter): Query<PartFilter>,
) -> ApiResult<Json<Vec<Part>>> {
    let parts = parts::list(&state.db, user_id, filter.drone_id).await?;
    Ok(Json(parts))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Part>> {
    let part = parts::get(&state.db, user_id, id).await?;
    Ok(Json(part))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CreatePart>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let id = parts::create(&state.db, user_id, &req).await?;
    info!(user_id, part_id = id, "Part created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "part created" })),
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<PartUpdate>,
) -> ApiResult<Json<serde_json::Value>> {
    parts::update(&state.db, user_id, id, &req).await?;
    Ok(Json(json!({ "message": "part updated" })))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    parts::delete(&state.db, user_id, id).await?;
    info!(user_id, part_id = id, "Part deleted");
    Ok(Json(json!({ "message": "part deleted" })))
}
