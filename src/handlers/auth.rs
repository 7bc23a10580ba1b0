// src/handlers/auth.rs

use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{next_step, AuthenticatedUser},
        i18n::Locale,
        json::AppJson,
    },
    models::auth::{
        AuthResponse, GoogleAuthorizeResponse, GoogleCallbackPayload, LoginUserPayload,
        MeResponse, SessionUser, User,
    },
};

fn auth_response(token: String, user: User) -> AuthResponse {
    let step = next_step(Some(&SessionUser::from(&user))).map(String::from);
    AuthResponse { token, user, next_step: step }
}

// GET /api/auth/google
#[utoipa::path(
    get,
    path = "/api/auth/google",
    tag = "Auth",
    responses(
        (status = 200, description = "URL de consentimento do Google", body = GoogleAuthorizeResponse),
        (status = 503, description = "Login com Google não configurado")
    )
)]
pub async fn google_authorize(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let google = app_state
        .google_oauth
        .as_ref()
        .ok_or(AppError::ServiceUnavailable("auth.google_disabled"))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let state = app_state
        .auth_service
        .issue_oauth_state()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(GoogleAuthorizeResponse {
        authorize_url: google.authorize_url(state.clone()),
        state,
    }))
}

// POST /api/auth/google/callback
#[utoipa::path(
    post,
    path = "/api/auth/google/callback",
    tag = "Auth",
    request_body = GoogleCallbackPayload,
    responses(
        (status = 200, description = "Sessão criada", body = AuthResponse),
        (status = 400, description = "State inválido ou expirado"),
        (status = 401, description = "Login recusado"),
        (status = 503, description = "Login com Google não configurado")
    )
)]
pub async fn google_callback(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<GoogleCallbackPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    payload.validate().map_err(|e| to_api(AppError::ValidationError(e)))?;

    let google = app_state
        .google_oauth
        .as_ref()
        .ok_or(AppError::ServiceUnavailable("auth.google_disabled"))
        .map_err(to_api)?;

    app_state.auth_service.verify_oauth_state(&payload.state).map_err(to_api)?;

    let profile = google.fetch_profile(&payload.code).await.map_err(to_api)?;
    let user = app_state.identity_service.resolve_sign_in(&profile).await.map_err(to_api)?;
    let token = app_state.auth_service.create_token(&user).map_err(to_api)?;

    Ok(Json(auth_response(token, user)))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (token, user) = app_state
        .auth_service
        .login_user(payload.email.trim(), &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(auth_response(token, user)))
}

// POST /api/auth/refresh
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Auth",
    responses(
        (status = 200, description = "Token reemitido com cargo/estado atuais", body = AuthResponse),
        (status = 401, description = "Não autenticado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let (token, user) = app_state
        .auth_service
        .refresh(&session)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(auth_response(token, user)))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário logado e próximo passo", body = MeResponse),
        (status = 401, description = "Não autenticado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .auth_service
        .current_user(&session)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let step = next_step(Some(&SessionUser::from(&user))).map(String::from);
    Ok(Json(MeResponse { user, next_step: step }))
}
