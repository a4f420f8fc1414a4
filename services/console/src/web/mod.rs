pub mod auth;
pub mod fetch;
pub mod middleware;
pub mod responses;
pub mod rest;
pub mod screens;
pub mod state;
pub mod views;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use middleware::require_token;
use state::AppState;

/// Builds every console route. Swagger UI is merged in by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no token required)
    let public_routes = Router::new()
        .route(
            "/login",
            get(auth::login_page_handler).post(auth::login_handler),
        )
        .route("/logout", post(auth::logout_handler))
        .route("/api/health", get(rest::health_handler))
        .route("/api/session", get(rest::session_handler));

    // Protected screens (token required)
    let protected_routes = Router::new()
        .route("/", get(screens::dashboard_handler))
        .route(
            "/companies",
            get(screens::companies_handler).post(screens::save_company_handler),
        )
        .route("/companies/{id}/delete", post(screens::delete_company_handler))
        .route(
            "/clients",
            get(screens::clients_handler).post(screens::save_client_handler),
        )
        .route("/clients/{id}/delete", post(screens::delete_client_handler))
        .route(
            "/admins",
            get(screens::admins_handler).post(screens::create_admin_handler),
        )
        .route("/admins/{id}/delete", post(screens::delete_admin_handler))
        .route("/contact-us", get(screens::contact_us_handler))
        .route("/reports/{kind}", get(screens::reports_handler))
        .route("/reports/oil/{id}/pdf", get(screens::oil_pdf_handler))
        .route(
            "/reports/ht-breaker/{id}/pdf",
            get(screens::ht_breaker_pdf_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_token,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
