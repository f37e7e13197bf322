//! Bulk snapshot import endpoint.

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use hangar_core::ImportSnapshot;

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::persistence::import;
use crate::state::AppState;

pub async fn import_snapshot(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(snapshot): Json<ImportSnapshot>,
) -> ApiResult<Json<serde_json::Value>> {
    info!(user_id, "Snapshot import requested");
    import::import_snapshot(&state.db, user_id, &snapshot).await?;
    Ok(Json(json!({ "message": "import complete" })))
}
