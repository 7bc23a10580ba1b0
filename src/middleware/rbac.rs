// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        auth::{SessionUser, UserState},
        rbac::Role,
    },
};

/// 1. O Trait que define quem pode passar por uma rota
pub trait AccessPolicy: Send + Sync + 'static {
    /// Cargos aceitos. Lista vazia = qualquer cargo.
    fn allowed() -> &'static [Role];

    /// Exige conta ACTIVE?
    fn must_be_active() -> bool {
        true
    }
}

/// A decisão em si, sem nada de HTTP.
/// Ordem: sem sessão -> 401; inativo -> 403; cargo fora da lista -> 403.
pub fn authorize<'a>(
    session: Option<&'a SessionUser>,
    allowed: &[Role],
    must_be_active: bool,
) -> Result<&'a SessionUser, AppError> {
    let session = session.ok_or(AppError::Unauthenticated)?;

    if must_be_active && session.state != UserState::Active {
        return Err(AppError::Forbidden("forbidden.pending_approval"));
    }

    if !allowed.is_empty() && !allowed.contains(&session.role) {
        return Err(AppError::Forbidden("forbidden.insufficient_permissions"));
    }

    Ok(session)
}

/// 2. O Extractor (Guardião). Entrega a sessão já autorizada.
pub struct RequireRole<P>(pub SessionUser, pub PhantomData<P>);

impl<P, S> FromRequestParts<S> for RequireRole<P>
where
    P: AccessPolicy,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<SessionUser>().cloned();

        match authorize(session.as_ref(), P::allowed(), P::must_be_active()) {
            Ok(user) => Ok(RequireRole(user.clone(), PhantomData)),
            Err(err) => {
                let app_state = AppState::from_ref(state);
                let locale = Locale::from_request_parts(parts, state).await.unwrap_or_default();
                if let Some(user) = &session {
                    tracing::warn!(
                        "⛔ Acesso negado para {} ({}, {:?})",
                        user.id,
                        user.role,
                        user.state
                    );
                }
                Err(err.to_api_error(&locale, &app_state.i18n_store))
            }
        }
    }
}

// ---
// DEFINIÇÃO DAS POLÍTICAS (TIPOS)
// ---

/// Qualquer sessão, em qualquer estado.
pub struct AnySession;
impl AccessPolicy for AnySession {
    fn allowed() -> &'static [Role] { &[] }
    fn must_be_active() -> bool { false }
}

/// Qualquer usuário ACTIVE.
pub struct AnyActiveUser;
impl AccessPolicy for AnyActiveUser {
    fn allowed() -> &'static [Role] { &[] }
}

pub struct OrgAdmins;
impl AccessPolicy for OrgAdmins {
    fn allowed() -> &'static [Role] { &[Role::OrgAdmin, Role::SuperAdmin] }
}

pub struct OrgAdminOnly;
impl AccessPolicy for OrgAdminOnly {
    fn allowed() -> &'static [Role] { &[Role::OrgAdmin] }
}

/// O admin que ainda está no onboarding (o serviço exige PENDING).
pub struct PendingOrgAdmin;
impl AccessPolicy for PendingOrgAdmin {
    fn allowed() -> &'static [Role] { &[Role::OrgAdmin] }
    fn must_be_active() -> bool { false }
}

pub struct EventReviewers;
impl AccessPolicy for EventReviewers {
    fn allowed() -> &'static [Role] {
        &[Role::OrgAdmin, Role::SuperAdmin, Role::ResourceManager]
    }
}
