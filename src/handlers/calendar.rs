// src/handlers/calendar.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::event::{CalendarQuery, CalendarResponse},
};

// GET /api/public/calendar
#[utoipa::path(
    get,
    path = "/api/public/calendar",
    tag = "Calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Eventos públicos aprovados do tenant padrão", body = CalendarResponse)
    )
)]
pub async fn public_calendar(
    State(app_state): State<AppState>,
    locale: Locale,
    TenantContext(tenant): TenantContext,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let events = app_state
        .calendar_service
        .public_calendar(tenant.as_ref(), &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(CalendarResponse { events }))
}

// GET /api/public/{tenant_slug}/calendar
#[utoipa::path(
    get,
    path = "/api/public/{tenant_slug}/calendar",
    tag = "Calendar",
    params(
        ("tenant_slug" = String, Path, description = "Slug da faculdade"),
        CalendarQuery
    ),
    responses(
        (status = 200, description = "Eventos públicos aprovados da faculdade", body = CalendarResponse),
        (status = 404, description = "Faculdade não encontrada")
    )
)]
pub async fn tenant_calendar(
    state: State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    query: Query<CalendarQuery>,
) -> Result<impl IntoResponse, ApiError> {
    public_calendar(state, locale, tenant, query).await
}
