// src/middleware/json.rs

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequest, Request},
    http::header,
    Json,
};
use serde::de::DeserializeOwned;

use crate::{
    common::{
        error::{ApiError, AppError},
        i18n::I18nStore,
    },
    middleware::i18n::Locale,
};

/// `Json<T>` com a rejeição no formato de erro da API:
/// corpo ilegível vira 400 `{"error", "details"}` no idioma do cliente.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    Arc<I18nStore>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let locale = req
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                tracing::debug!("⚠️ Corpo rejeitado ({}): {}", rejection.status(), rejection.body_text());
                let i18n = Arc::<I18nStore>::from_ref(state);
                Err(AppError::MalformedBody(rejection.body_text()).to_api_error(&locale, &i18n))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        count: u32,
    }

    #[derive(Clone)]
    struct TestState(Arc<I18nStore>);

    impl FromRef<TestState> for Arc<I18nStore> {
        fn from_ref(state: &TestState) -> Self {
            state.0.clone()
        }
    }

    fn state() -> TestState {
        TestState(Arc::new(I18nStore::load_embedded().unwrap()))
    }

    fn json_request(body: &'static str, lang: &str) -> Request {
        Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT_LANGUAGE, lang)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn well_formed_bodies_pass_through() {
        let parsed = AppJson::<Sample>::from_request(json_request(r#"{"count":3}"#, "en"), &state()).await;
        assert_eq!(parsed.unwrap().0.count, 3);
    }

    #[tokio::test]
    async fn wrong_types_become_a_localized_bad_request() {
        let rejected = AppJson::<Sample>::from_request(json_request(r#"{"count":"três"}"#, "pt"), &state())
            .await
            .unwrap_err();

        assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
        assert_eq!(rejected.error, "O corpo da requisição não é um JSON válido para este endpoint.");
        assert!(rejected.details.as_ref().unwrap()["body"][0].is_string());
    }

    #[tokio::test]
    async fn missing_content_type_is_also_a_bad_request() {
        let request = Request::post("/").body(Body::from(r#"{"count":3}"#)).unwrap();
        let rejected = AppJson::<Sample>::from_request(request, &state()).await.unwrap_err();
        assert_eq!(rejected.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
