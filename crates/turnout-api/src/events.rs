// Event and registration HTTP routes

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use turnout_core::{Event, EventDetail, EventStats, EventStore, NewEvent, NewUser, User};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::ApiError;
use crate::services::{EventService, RegistrationService};

/// App state for event routes
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventService>,
    pub registrations: Arc<RegistrationService>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            events: Arc::new(EventService::new(store.clone())),
            registrations: Arc::new(RegistrationService::new(store)),
        }
    }
}

/// Create event routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/upcoming/events", get(list_upcoming))
        .route("/events/test-create-user", post(test_create_user))
        .route("/events/{id}", get(get_event))
        .route(
            "/events/{id}/register",
            post(register_user).delete(cancel_registration),
        )
        .route("/events/{id}/stats", get(get_stats))
        .with_state(state)
}

/// Request to create an event
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    /// ISO 8601 timestamp, strictly in the future
    #[validate(custom(function = validate_future_date))]
    pub date: DateTime<Utc>,
    #[validate(length(min = 1, message = "location must not be empty"))]
    pub location: String,
    #[validate(range(min = 1, max = 1000, message = "capacity must be between 1 and 1000"))]
    pub capacity: i32,
}

fn validate_future_date(date: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *date > Utc::now() {
        Ok(())
    } else {
        Err(ValidationError::new("past_date").with_message("Date must be in the future".into()))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventResponse {
    pub event_id: i64,
}

/// Body for register and cancel
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(range(min = 1, message = "userId must be a positive integer"))]
    pub user_id: i64,
}

/// Test-support user creation; deliberately unvalidated
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /events - Create a new event
#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = CreateEventResponse),
        (status = 400, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<CreateEventResponse>), ApiError> {
    req.validate()?;

    let event = state
        .events
        .create(NewEvent {
            title: req.title,
            date: req.date,
            location: req.location,
            capacity: req.capacity,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateEventResponse { event_id: event.id }),
    ))
}

/// GET /events/{id} - Event details with registered users
#[utoipa::path(
    get,
    path = "/events/{id}",
    params(
        ("id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = EventDetail),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EventDetail>, ApiError> {
    let detail = state.events.detail(id).await?;
    Ok(Json(detail))
}

/// POST /events/{id}/register - Register a user for an event
#[utoipa::path(
    post,
    path = "/events/{id}/register",
    params(
        ("id" = i64, Path, description = "Event ID")
    ),
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = MessageResponse),
        (status = 400, description = "Validation failed, event expired or full, or duplicate registration"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "registrations"
)]
pub async fn register_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    req.validate()?;

    state.registrations.register(id, req.user_id).await?;

    Ok(Json(MessageResponse {
        message: "User registered successfully".to_string(),
    }))
}

/// DELETE /events/{id}/register - Cancel a registration
#[utoipa::path(
    delete,
    path = "/events/{id}/register",
    params(
        ("id" = i64, Path, description = "Event ID")
    ),
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration cancelled", body = MessageResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Registration not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "registrations"
)]
pub async fn cancel_registration(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    req.validate()?;

    state.registrations.cancel(id, req.user_id).await?;

    Ok(Json(MessageResponse {
        message: "Registration cancelled".to_string(),
    }))
}

/// GET /events/upcoming/events - Events still ahead, soonest first
#[utoipa::path(
    get,
    path = "/events/upcoming/events",
    responses(
        (status = 200, description = "Upcoming events sorted by date, then location", body = Vec<Event>),
        (status = 500, description = "Internal server error")
    ),
    tag = "events"
)]
pub async fn list_upcoming(
    State(state): State<AppState>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.events.upcoming().await?;
    Ok(Json(events))
}

/// GET /events/{id}/stats - Capacity statistics
#[utoipa::path(
    get,
    path = "/events/{id}/stats",
    params(
        ("id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Capacity statistics", body = EventStats),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "events"
)]
pub async fn get_stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EventStats>, ApiError> {
    let stats = state.registrations.stats(id).await?;
    Ok(Json(stats))
}

/// POST /events/test-create-user - Create a user (test support)
#[utoipa::path(
    post,
    path = "/events/test-create-user",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = User),
        (status = 500, description = "Internal server error")
    ),
    tag = "test-support"
)]
pub async fn test_create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .events
        .create_user(NewUser {
            name: req.name,
            email: req.email,
        })
        .await?;
    Ok(Json(user))
}
