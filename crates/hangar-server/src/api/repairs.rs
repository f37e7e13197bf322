//! Repair log endpoints.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use hangar_core::{CreateRepair, Repair, RepairUpdate};

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::persistence::repairs;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RepairFilter {
    pub drone_id: Option<i64>,
    pub part_id: Option<i64>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(filter): Query<RepairFilter>,
) -> ApiResult<Json<Vec<Repair>>> {
    let repairs = repairs::list(&state.db, user_id, filter.drone_id, filter.part_id).await?;
    Ok(Json(repairs))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Repair>> {
    let repair = repairs::get(&state.db, user_id, id).await?;
    Ok(Json(repair))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CreateRepair>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let id = repairs::create(&state.db, user_id, &req).await?;
    info!(user_id, repair_id = id, "Repair logged");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "repair created" })),
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<RepairUpdate>,
) -> ApiResult<Json<serde_json::Value>> {
    repairs::update(&state.db, user_id, id, &req).await?;
    Ok(Json(json!({ "message": "repair updated" })))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    repairs::delete(&state.db, user_id, id).await?;
    Ok(Json(json!({ "message": "repair deleted" })))
}
