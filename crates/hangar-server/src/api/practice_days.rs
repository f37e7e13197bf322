//! Practice day endpoints.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use hangar_core::{CreatePracticeDay, PracticeDay, PracticeDayUpdate};

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::persistence::practice_days;
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<PracticeDay>>> {
    let days = practice_days::list(&state.db, user_id).await?;
    Ok(Json(days))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PracticeDay>> {
    let day = practice_days::get(&state.db, user_id, id).await?;
    Ok(Json(day))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CreatePracticeDay>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let id = practice_days::create(&state.db, user_id, &req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "practice day created" })),
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<PracticeDayUpdate>,
) -> ApiResult<Json<serde_json::Value>> {
    practice_days::update(&state.db, user_id, id, &req).await?;
    Ok(Json(json!({ "message": "practice day updated" })))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    practice_days::delete(&state.db, user_id, id).await?;
    Ok(Json(json!({ "message": "practice day deleted" })))
}
