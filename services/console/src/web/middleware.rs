//! services/console/src/web/middleware.rs
//!
//! The route guard for protected screens.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use fieldtest_core::domain::Bearer;
use fieldtest_core::guard::{guard, GuardDecision, Route};
use std::sync::Arc;
use tracing::debug;

use crate::web::responses::{read_cookie, to_login, TOKEN_COOKIE};
use crate::web::state::{AppState, UserSession};

/// Middleware that checks for a stored token and attaches the browser's session.
///
/// Only the token's presence is checked. Without one the browser is sent to
/// `/login` before any authenticated request is issued.
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let route = Route::from_path(req.uri().path()).unwrap_or(Route::Dashboard);
    let token = read_cookie(req.headers(), TOKEN_COOKIE);

    let token = match (guard(route, token.as_deref()), token) {
        (GuardDecision::Allow, Some(token)) => token,
        _ => {
            debug!("No token for {}; redirecting to /login", req.uri().path());
            return to_login(None);
        }
    };

    // Unknown tokens get a throwaway session. Only a login registers one.
    let bearer = Bearer::new(token);
    let session = state
        .sessions
        .get(&bearer)
        .unwrap_or_else(|| Arc::new(UserSession::new(bearer)));
    req.extensions_mut().insert(session);

    next.run(req).await
}
