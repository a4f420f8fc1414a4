//! services/console/src/bin/console.rs

use axum::Router;
use console_lib::{
    adapters::{
        http::HttpApiAdapter,
        layers::{LoggingLayer, UnauthorizedLayer},
        pdf::PrintPdfRenderer,
    },
    config::Config,
    error::ConsoleError,
    web::{
        router,
        rest::ApiDoc,
        state::{AppState, SessionRegistry},
    },
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ConsoleError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting console...");

    // --- 2. Initialize Service Adapters ---
    let sessions = Arc::new(SessionRegistry::with_limits(
        config.session_idle,
        config.max_sessions,
    ));
    let api = HttpApiAdapter::new(&config.api_base_url)?
        .with_layer(Arc::new(LoggingLayer))
        .with_layer(Arc::new(UnauthorizedLayer::new(sessions.clone())));
    info!("Remote API at {}", config.api_base_url);

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        api: Arc::new(api),
        renderer: Arc::new(PrintPdfRenderer::new()),
        sessions,
        config: config.clone(),
    });

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
