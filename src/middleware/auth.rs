// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
    RequestExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{authorize, AccessPolicy, AnySession},
    },
    models::{
        auth::{SessionUser, UserState},
        rbac::Role,
    },
};

// Carrega a sessão (se houver) para dentro dos extensions.
// Não rejeita nada: quem decide é o RequireRole de cada rota.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request
        .extract_parts::<TypedHeader<Authorization<Bearer>>>()
        .await
        .ok();

    if let Some(TypedHeader(Authorization(bearer))) = bearer {
        match app_state.auth_service.decode_session(bearer.token()) {
            Ok(session) => {
                request.extensions_mut().insert(session);
            }
            Err(e) => {
                tracing::debug!("🔒 Token ignorado: {}", e);
            }
        }
    }

    next.run(request).await
}

/// Qualquer sessão válida, em qualquer estado (PENDING incluso).
pub struct AuthenticatedUser(pub SessionUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<SessionUser>().cloned();

        match authorize(session.as_ref(), AnySession::allowed(), AnySession::must_be_active()) {
            Ok(user) => Ok(AuthenticatedUser(user.clone())),
            Err(err) => {
                let app_state = AppState::from_ref(state);
                let locale = Locale::from_request_parts(parts, state).await.unwrap_or_default();
                Err(err.to_api_error(&locale, &app_state.i18n_store))
            }
        }
    }
}

/// Para onde o cliente deve mandar o usuário. `None` = pode seguir.
pub fn next_step(session: Option<&SessionUser>) -> Option<&'static str> {
    let Some(session) = session else {
        return Some("/auth/signin");
    };

    match (session.state, session.role) {
        (UserState::Active, _) => None,
        (UserState::Suspended, _) => Some("/pending"),
        (UserState::Pending, Role::OrgAdmin) => Some("/onboarding/admin"),
        (UserState::Pending, Role::DeptCoord) => Some("/onboarding/faculty"),
        (UserState::Pending, _) => Some("/pending-approval"),
    }
}
