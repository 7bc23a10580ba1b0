// src/handlers/events.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        json::AppJson,
        rbac::{AnyActiveUser, EventReviewers, RequireRole},
    },
    models::event::{CreateEventPayload, Event, ReviewEventPayload},
};

// POST /api/events
#[utoipa::path(
    post,
    path = "/api/events",
    tag = "Events",
    request_body = CreateEventPayload,
    responses(
        (status = 201, description = "Reserva criada (PENDING)", body = Event),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Sala não encontrada"),
        (status = 409, description = "Sala já reservada no horário")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn create_event(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(actor, _): RequireRole<AnyActiveUser>,
    AppJson(payload): AppJson<CreateEventPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let event = app_state
        .event_service
        .create_event(&actor, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(event)))
}

// PUT /api/admin/events/{id}/status
#[utoipa::path(
    put,
    path = "/api/admin/events/{id}/status",
    tag = "Events",
    request_body = ReviewEventPayload,
    params(
        ("id" = Uuid, Path, description = "ID do evento")
    ),
    responses(
        (status = 200, description = "Status atualizado", body = Event),
        (status = 400, description = "Status não permitido"),
        (status = 404, description = "Evento não encontrado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn review_event(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(actor, _): RequireRole<EventReviewers>,
    Path(event_id): Path<Uuid>,
    AppJson(payload): AppJson<ReviewEventPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let event = app_state
        .event_service
        .review_event(&actor, event_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(event))
}
