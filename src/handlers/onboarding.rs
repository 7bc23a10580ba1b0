// src/handlers/onboarding.rs

use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        json::AppJson,
        rbac::{PendingOrgAdmin, RequireRole},
    },
    models::campus::{OnboardingPayload, OnboardingResponse},
};

// POST /api/admin/onboarding
#[utoipa::path(
    post,
    path = "/api/admin/onboarding",
    tag = "Onboarding",
    request_body = OnboardingPayload,
    responses(
        (status = 200, description = "Faculdade configurada e admin ativado", body = OnboardingResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Só para ORG_ADMIN ainda PENDING"),
        (status = 409, description = "Outra faculdade já usa este nome")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn complete_onboarding(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(actor, _): RequireRole<PendingOrgAdmin>,
    AppJson(payload): AppJson<OnboardingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (admin, summary) = app_state
        .onboarding_service
        .complete(&actor, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // O token antigo ainda diz PENDING
    let token = app_state
        .auth_service
        .create_token(&admin)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(OnboardingResponse {
        message: "Onboarding completed successfully".to_string(),
        token,
        summary,
    }))
}
