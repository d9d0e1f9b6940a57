// Turnout API server
// Decision: no ambient singletons - the store handle is built here and
// injected into the router state

mod error;
mod events;
mod rate_limit;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turnout_core::{Event, EventDetail, EventStats, User};
use turnout_storage::Database;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::rate_limit::RateLimiter;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        events::create_event,
        events::get_event,
        events::register_user,
        events::cancel_registration,
        events::list_upcoming,
        events::get_stats,
        events::test_create_user,
    ),
    components(
        schemas(
            Event, User, EventDetail, EventStats,
            events::CreateEventRequest,
            events::CreateEventResponse,
            events::RegisterRequest,
            events::CreateUserRequest,
            events::MessageResponse,
        )
    ),
    tags(
        (name = "events", description = "Event management endpoints"),
        (name = "registrations", description = "Registration endpoints"),
        (name = "test-support", description = "Test-support endpoints")
    ),
    info(
        title = "Turnout API",
        version = "0.1.0",
        description = "API for managing events and user registrations",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turnout_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("turnout-api starting...");

    // Initialize database
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;
    let db = Database::from_url(&database_url)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;
    tracing::info!("Connected to database");

    // Create app state
    let state = events::AppState::new(Arc::new(db));

    // Per-IP request limiter applied to the whole surface
    let limiter = RateLimiter::from_env();

    let app = Router::new()
        .route("/health", get(health))
        .merge(events::routes(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::rate_limit,
        ))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
