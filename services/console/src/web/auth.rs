//! services/console/src/web/auth.rs
//!
//! Login and logout handlers.

use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Response},
};
use fieldtest_core::domain::Bearer;
use fieldtest_core::forms::{FieldErrors, LoginForm, LoginOutcome};
use fieldtest_core::ports::PortError;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::web::responses::{
    clear_cookie, read_cookie, redirect_with_cookies, set_cookie, to_login, Flash, FLASH_COOKIE,
    TOKEN_COOKIE,
};
use crate::web::state::AppState;
use crate::web::views;

//=========================================================================================
// Payloads
//=========================================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Shows the login form, consuming any pending toast.
pub async fn login_page_handler(headers: HeaderMap) -> Response {
    let flash = read_cookie(&headers, FLASH_COOKIE).and_then(|key| Flash::from_key(&key));
    let mut response = Html(views::login_page("", None, flash.map(Flash::message))).into_response();
    if flash.is_some() {
        if let Ok(value) = HeaderValue::from_str(&clear_cookie(FLASH_COOKIE)) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

/// Validates the form, calls the remote login endpoint and stores the session.
pub async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    Form(input): Form<LoginInput>,
) -> Response {
    let form = LoginForm {
        email: input.email,
        password: input.password,
    };
    let request = match form.to_request() {
        Ok(request) => request,
        Err(errors) => return login_again(&form.email, &errors, None),
    };

    match app_state.api.login(&request).await {
        Ok(LoginOutcome::Authenticated(success)) => {
            info!("Login succeeded for '{}' ({})", success.auth.username, success.auth.role.label());
            let cookie = set_cookie(
                TOKEN_COOKIE,
                success.bearer.as_str(),
                app_state.config.secure_cookies,
            );
            if HeaderValue::from_str(&cookie).is_err() {
                error!(
                    "Login for '{}' returned a token that cannot be stored in a cookie",
                    success.auth.username
                );
                return login_again(
                    &request.email,
                    &FieldErrors::new(),
                    Some(SIGN_IN_UNAVAILABLE),
                );
            }
            app_state.sessions.start(success.bearer, success.auth).await;
            redirect_with_cookies("/", &[cookie, clear_cookie(FLASH_COOKIE)])
        }
        Ok(outcome @ LoginOutcome::UsernameNotFound) => {
            warn!("Login rejected: unknown user '{}'", request.email);
            let errors = outcome.field_errors().unwrap_or_default();
            login_again(&request.email, &errors, None)
        }
        Err(PortError::Unauthorized) | Err(PortError::Rejected(_)) => {
            let mut errors = FieldErrors::new();
            errors.insert("password", "Invalid email or password");
            login_again(&request.email, &errors, None)
        }
        Err(e) => {
            error!("Login request failed: {}", e);
            login_again(
                &request.email,
                &FieldErrors::new(),
                Some(SIGN_IN_UNAVAILABLE),
            )
        }
    }
}

const SIGN_IN_UNAVAILABLE: &str = "Unable to sign in right now. Please try again.";

fn login_again(email: &str, errors: &FieldErrors, notice: Option<&str>) -> Response {
    Html(views::login_page(email, Some(errors), notice)).into_response()
}

/// Clears every slice and the stored token, then returns to the login screen.
pub async fn logout_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    if let Some(token) = read_cookie(&headers, TOKEN_COOKIE) {
        let bearer = Bearer::new(token);
        if let Some(session) = app_state.sessions.get(&bearer) {
            session.state.lock().await.reset();
        }
        app_state.sessions.remove(&bearer);
    }
    to_login(Some(Flash::LoggedOut))
}
