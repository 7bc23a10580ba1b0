// src/handlers/admin.rs

use axum::{
    extract::{Path, Query, State},
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
        rbac::{OrgAdminOnly, OrgAdmins, RequireRole},
    },
    models::{
        account_request::{AccountRequest, AccountRequestFilter, ReviewAccountRequestPayload},
        auth::{ApprovalResponse, ApproveUserPayload, PendingUsersResponse, UpdateUserPayload, User},
    },
    services::user_admin_service::ApprovalOutcome,
};

// GET /api/admin/pending-users
#[utoipa::path(
    get,
    path = "/api/admin/pending-users",
    tag = "Admin",
    responses(
        (status = 200, description = "Usuários PENDING da faculdade, mais novos primeiro", body = PendingUsersResponse),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Sem permissão")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_pending_users(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(actor, _): RequireRole<OrgAdmins>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .user_admin_service
        .list_pending(&actor)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(PendingUsersResponse { users }))
}

// PUT /api/admin/users/{id}
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    request_body = UpdateUserPayload,
    params(
        ("id" = Uuid, Path, description = "ID do usuário")
    ),
    responses(
        (status = 200, description = "Usuário atualizado", body = User),
        (status = 400, description = "Transição de estado inválida"),
        (status = 403, description = "Outra faculdade ou hierarquia insuficiente"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(actor, _): RequireRole<OrgAdmins>,
    Path(user_id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .user_admin_service
        .update_user(&actor, user_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(user))
}

// PUT /api/admin/users/{id}/approve
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/approve",
    tag = "Admin",
    request_body = ApproveUserPayload,
    params(
        ("id" = Uuid, Path, description = "ID do usuário pendente")
    ),
    responses(
        (status = 200, description = "Aprovado (ou rejeitado e removido)", body = ApprovalResponse),
        (status = 400, description = "Usuário não está PENDING ou corpo inválido"),
        (status = 403, description = "Outra faculdade ou hierarquia insuficiente"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn approve_user(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(actor, _): RequireRole<OrgAdminOnly>,
    Path(user_id): Path<Uuid>,
    AppJson(payload): AppJson<ApproveUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let outcome = app_state
        .user_admin_service
        .approve_user(&actor, user_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let response = match outcome {
        ApprovalOutcome::Approved(user) => ApprovalResponse {
            message: "User approved successfully".to_string(),
            user: Some(user),
        },
        ApprovalOutcome::Rejected => ApprovalResponse {
            message: "User rejected and removed".to_string(),
            user: None,
        },
    };

    Ok(Json(response))
}

// GET /api/admin/account-requests
#[utoipa::path(
    get,
    path = "/api/admin/account-requests",
    tag = "Admin",
    params(AccountRequestFilter),
    responses(
        (status = 200, description = "Pedidos de conta da faculdade", body = Vec<AccountRequest>),
        (status = 403, description = "Sem permissão")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_account_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(actor, _): RequireRole<OrgAdmins>,
    Query(filter): Query<AccountRequestFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let requests = app_state
        .account_service
        .list_requests(&actor, filter.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(requests))
}

// PUT /api/admin/account-requests/{id}
#[utoipa::path(
    put,
    path = "/api/admin/account-requests/{id}",
    tag = "Admin",
    request_body = ReviewAccountRequestPayload,
    params(
        ("id" = Uuid, Path, description = "ID do pedido")
    ),
    responses(
        (status = 200, description = "Pedido revisado", body = AccountRequest),
        (status = 400, description = "Pedido já encerrado"),
        (status = 403, description = "Outra faculdade ou hierarquia insuficiente"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn review_account_request(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(actor, _): RequireRole<OrgAdmins>,
    Path(request_id): Path<Uuid>,
    AppJson(payload): AppJson<ReviewAccountRequestPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .account_service
        .review_request(&actor, request_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(request))
}
