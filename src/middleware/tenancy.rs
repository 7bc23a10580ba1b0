// src/middleware/tenancy.rs

use std::collections::HashMap;

use axum::extract::{FromRef, FromRequestParts, Path};
use axum::http::request::Parts;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::tenancy::Tenant,
};

// Nome do parâmetro de rota que escolhe a faculdade
const TENANT_SLUG_PARAM: &str = "tenant_slug";

// O tenant das rotas públicas: vem de `{tenant_slug}` ou, sem ele, é o tenant padrão.
// `None` só quando o tenant padrão ainda não foi criado; a leitura não cria nada.
#[derive(Debug, Clone)]
pub struct TenantContext(pub Option<Tenant>);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state).await.unwrap_or_default();

        // Rotas sem parâmetros não têm Path: cai no tenant padrão
        let slug = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Path(mut params)| params.remove(TENANT_SLUG_PARAM));

        let tenant = match slug {
            Some(slug) => app_state.tenant_service.find_by_slug(&slug).await.map(Some),
            None => app_state.tenant_service.find_default().await,
        }
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        Ok(TenantContext(tenant))
    }
}
