//! services/console/src/web/rest.rs
//!
//! The console's small JSON surface and the master definition for its
//! OpenAPI specification.

use crate::web::responses::{read_cookie, TOKEN_COOKIE};
use crate::web::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use fieldtest_core::domain::Bearer;
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        session_handler,
        health_handler,
    ),
    components(
        schemas(SessionResponse, HealthResponse)
    ),
    tags(
        (name = "Field Test Console", description = "Session introspection for the admin console.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

/// The logged-in user as the console remembers them.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    role: String,
    role_id: i64,
    username: String,
    email: String,
    is_master_admin: bool,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    sessions: usize,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Returns the auth state held for the caller's token.
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "The caller is logged in", body = SessionResponse),
        (status = 401, description = "No token, or no login recorded for it")
    )
)]
pub async fn session_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let token = read_cookie(&headers, TOKEN_COOKIE)
        .ok_or_else(|| (StatusCode::UNAUTHORIZED, "Not logged in".to_string()))?;
    let session = app_state
        .sessions
        .get(&Bearer::new(token))
        .ok_or_else(|| (StatusCode::UNAUTHORIZED, "Not logged in".to_string()))?;

    let state = session.state.lock().await;
    let auth = state
        .auth()
        .ok_or_else(|| (StatusCode::UNAUTHORIZED, "Not logged in".to_string()))?;
    Ok(Json(SessionResponse {
        role: auth.role.label().to_string(),
        role_id: auth.role_id,
        username: auth.username.clone(),
        email: auth.email.clone(),
        is_master_admin: auth.role.is_master_admin(),
    }))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "The console is up", body = HealthResponse)
    )
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: app_state.sessions.len(),
    })
}
