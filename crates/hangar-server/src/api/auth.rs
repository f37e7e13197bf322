//! Session authentication: register/login/logout/me and the middleware
//! guarding every resource route.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use hangar_core::{optional_trimmed, required_trimmed, Error, LoginRequest, RegisterRequest};

use crate::api::error::{ApiResult, HttpError};
use crate::password;
use crate::persistence::users;
use crate::session::{clear_session_cookie, session_cookie, SESSION_COOKIE};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

/// The authenticated user's id, injected by [`require_session`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

/// Middleware that resolves the session cookie into a [`CurrentUser`]
/// extension, rejecting the request with 401 when absent or invalid.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let user_id = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.verify(cookie.value()));

    match user_id {
        Some(user_id) => {
            request.extensions_mut().insert(CurrentUser(user_id));
            next.run(request).await
        }
        None => HttpError(Error::Unauthenticated(
            "authentication required".to_string(),
        ))
        .into_response(),
    }
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<serde_json::Value>)> {
    let username = required_trimmed(req.username.as_deref(), "username")?;
    let password = req
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::Validation("password is required".to_string()))?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(
            "password must be at least 8 characters".to_string(),
        )
        .into());
    }
    let email = optional_trimmed(req.email.as_deref());

    let hash = password::hash_password(password)?;
    let user_id = users::create_user(&state.db, &username, email.as_deref(), &hash).await?;
    let user = users::require_user(&state.db, user_id).await?;

    info!(user_id, %username, "User registered");

    // Registration logs the new user in immediately.
    let token = state
        .sessions
        .issue(user_id)
        .map_err(|e| Error::Internal(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token)),
        Json(json!({ "message": "registration complete", "user": user })),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<serde_json::Value>)> {
    let username = required_trimmed(req.username.as_deref(), "username")?;
    let password = req
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::Validation("password is required".to_string()))?;

    let credentials = users::find_credentials(&state.db, &username).await?;
    let user_id = match credentials {
        Some((id, hash)) if password::verify_password(password, &hash) => id,
        // Same body whether the username or the password was wrong.
        _ => {
            return Err(Error::Unauthenticated(
                "invalid username or password".to_string(),
            )
            .into())
        }
    };

    let user = users::require_user(&state.db, user_id).await?;
    let token = state
        .sessions
        .issue(user_id)
        .map_err(|e| Error::Internal(e.to_string()))?;

    info!(user_id, %username, "User logged in");

    Ok((
        jar.add(session_cookie(token)),
        Json(json!({ "message": "login successful", "user": user })),
    ))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    (
        jar.add(clear_session_cookie()),
        Json(json!({ "message": "logged out" })),
    )
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user_id)): axum::Extension<CurrentUser>,
) -> ApiResult<Json<hangar_core::User>> {
    let user = users::require_user(&state.db, user_id).await?;
    Ok(Json(user))
}
