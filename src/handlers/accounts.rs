// src/handlers/accounts.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, json::AppJson},
    models::account_request::{
        AccountRequestPayload, AccountRequestReceipt, RequestAccountPayload, RequestAccountResponse,
    },
};

// POST /api/request-account
#[utoipa::path(
    post,
    path = "/api/request-account",
    tag = "Accounts",
    request_body = RequestAccountPayload,
    responses(
        (status = 201, description = "Conta criada como PENDING", body = RequestAccountResponse),
        (status = 400, description = "Dados inválidos ou e-mail já cadastrado")
    )
)]
pub async fn request_account(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<RequestAccountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .account_service
        .request_account(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(RequestAccountResponse {
            message: "Account request submitted successfully. You will be notified once approved."
                .to_string(),
            user_id: user.id,
        }),
    ))
}

// POST /api/account-request
#[utoipa::path(
    post,
    path = "/api/account-request",
    tag = "Accounts",
    request_body = AccountRequestPayload,
    responses(
        (status = 201, description = "Pedido registrado", body = AccountRequestReceipt),
        (status = 400, description = "Dados inválidos ou e-mail já cadastrado")
    )
)]
pub async fn submit_account_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<AccountRequestPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .account_service
        .submit_request(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(AccountRequestReceipt {
            success: true,
            message: "Account request submitted successfully".to_string(),
            request_id: request.id,
        }),
    ))
}
