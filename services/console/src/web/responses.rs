//! services/console/src/web/responses.rs
//!
//! Cookie helpers, flash toasts and the error type handlers return.

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use fieldtest_core::ports::PortError;
use tracing::{error, warn};

use crate::web::views;

/// Cookie holding the remote API's bearer token.
pub const TOKEN_COOKIE: &str = "token";
/// Cookie carrying a one-shot toast key to the next page.
pub const FLASH_COOKIE: &str = "flash";

//=========================================================================================
// Cookies
//=========================================================================================

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (key, value) = c.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

pub fn set_cookie(name: &str, value: &str, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly;{} SameSite=Lax; Path=/",
        name,
        value,
        if secure { " Secure;" } else { "" }
    )
}

pub fn clear_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

/// A 303 to `location` with the given `Set-Cookie` values.
pub fn redirect_with_cookies(location: &str, cookies: &[String]) -> Response {
    let mut response = Redirect::to(location).into_response();
    for cookie in cookies {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(_) => {
                let name = cookie.split('=').next().unwrap_or_default();
                warn!(
                    "Dropping Set-Cookie '{}' on redirect to {}: not a valid header value",
                    name, location
                );
            }
        }
    }
    response
}

/// Back to `/login` with the token gone and a toast explaining why.
pub fn to_login(flash: Option<Flash>) -> Response {
    let mut cookies = vec![clear_cookie(TOKEN_COOKIE)];
    if let Some(flash) = flash {
        cookies.push(format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/",
            FLASH_COOKIE,
            flash.key()
        ));
    }
    redirect_with_cookies("/login", &cookies)
}

//=========================================================================================
// Flash Toasts
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    SessionExpired,
    LoggedOut,
}

impl Flash {
    pub fn key(self) -> &'static str {
        match self {
            Flash::SessionExpired => "expired",
            Flash::LoggedOut => "logged_out",
        }
    }

    pub fn from_key(key: &str) -> Option<Flash> {
        match key {
            "expired" => Some(Flash::SessionExpired),
            "logged_out" => Some(Flash::LoggedOut),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::SessionExpired => "Your session has expired. Please log in again.",
            Flash::LoggedOut => "You have been logged out.",
        }
    }
}

//=========================================================================================
// WebError
//=========================================================================================

/// Failures a handler cannot show inside its own page.
#[derive(Debug)]
pub enum WebError {
    /// The remote API rejected the token; the session is already gone.
    Unauthorized,
    Forbidden,
    NotFound(String),
    Internal(String),
}

impl From<PortError> for WebError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Unauthorized => WebError::Unauthorized,
            PortError::NotFound(what) => WebError::NotFound(what),
            PortError::Rejected(msg) | PortError::Unexpected(msg) => WebError::Internal(msg),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Unauthorized => to_login(Some(Flash::SessionExpired)),
            WebError::Forbidden => (
                StatusCode::FORBIDDEN,
                Html(views::message_page(
                    "Not permitted",
                    "Your role does not have access to this screen.",
                )),
            )
                .into_response(),
            WebError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Html(views::message_page("Not found", &format!("{} was not found.", what))),
            )
                .into_response(),
            WebError::Internal(msg) => {
                error!("Request failed: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    Html(views::message_page(
                        "Something went wrong",
                        "The service did not respond as expected. Please try again.",
                    )),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc123; flash=expired"),
        );
        assert_eq!(read_cookie(&headers, "token").as_deref(), Some("abc123"));
        assert_eq!(read_cookie(&headers, "flash").as_deref(), Some("expired"));
        assert_eq!(read_cookie(&headers, "sid"), None);
    }

    #[test]
    fn empty_cookie_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert_eq!(read_cookie(&headers, "token"), None);
    }

    #[test]
    fn invalid_cookie_is_skipped_without_losing_the_rest() {
        let response = redirect_with_cookies(
            "/",
            &["token=bad\nvalue; Path=/".to_string(), clear_cookie(FLASH_COOKIE)],
        );
        let cookies: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].to_str().unwrap().starts_with("flash=;"));
    }

    #[test]
    fn unauthorized_redirects_to_login_clearing_token() {
        let response = WebError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        let cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(cookies.iter().any(|c| c.starts_with("token=;") && c.contains("Max-Age=0")));
        assert!(cookies.iter().any(|c| c.starts_with("flash=expired")));
    }
}
