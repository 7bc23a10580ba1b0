use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use std::fmt::Write as _;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Nosso tipo de erro interno. As variantes "de negócio" carregam uma chave
// de mensagem que é traduzida só na borda (to_api_error).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Requisição inválida: {0}")]
    BadRequest(&'static str),

    #[error("Corpo da requisição inválido: {0}")]
    MalformedBody(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Não autenticado")]
    Unauthenticated,

    #[error("Login recusado")]
    SignInRejected,

    #[error("Acesso negado: {0}")]
    Forbidden(&'static str),

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Conflito: {0}")]
    Conflict(&'static str),

    #[error("Serviço indisponível: {0}")]
    ServiceUnavailable(&'static str),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro HTTP: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// O erro que de fato vai para o cliente (já traduzido).
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    /// Status HTTP + chave de mensagem de cada variante.
    pub fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation.failed"),
            AppError::BadRequest(key) => (StatusCode::BAD_REQUEST, *key),
            AppError::MalformedBody(_) => (StatusCode::BAD_REQUEST, "request.invalid_body"),
            AppError::EmailAlreadyExists => (StatusCode::BAD_REQUEST, "user.email_exists"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "auth.invalid_credentials"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "auth.invalid_token"),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "auth.required"),
            AppError::SignInRejected => (StatusCode::UNAUTHORIZED, "auth.sign_in_rejected"),
            AppError::Forbidden(key) => (StatusCode::FORBIDDEN, *key),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user.not_found"),
            AppError::NotFound(key) => (StatusCode::NOT_FOUND, *key),
            AppError::Conflict(key) => (StatusCode::CONFLICT, *key),
            AppError::ServiceUnavailable(key) => (StatusCode::SERVICE_UNAVAILABLE, *key),
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_)
            | AppError::HttpError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }

    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica só no log; o cliente recebe a mensagem genérica.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match &self {
            AppError::ValidationError(errors) => Some(Value::Object(validation_details(errors))),
            AppError::MalformedBody(reason) => Some(json!({ "body": [reason] })),
            _ => None,
        };

        ApiError {
            status,
            error: i18n.translate(&locale.0, key),
            details,
        }
    }
}

/// Achata os erros do validator em `{"campo": ["msg", ...]}`,
/// incluindo structs e listas aninhadas (`buildings[0].rooms[1].capacity`).
pub fn validation_details(errors: &ValidationErrors) -> Map<String, Value> {
    let mut details = Map::new();
    collect_details(errors, "", &mut details);
    details
}

fn collect_details(errors: &ValidationErrors, prefix: &str, out: &mut Map<String, Value>) {
    for (field, kind) in errors.errors() {
        let mut path = String::from(prefix);
        if !path.is_empty() {
            path.push('.');
        }
        let _ = write!(path, "{}", field);

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<Value> = field_errors
                    .iter()
                    .map(|e| {
                        let msg = e.message.as_ref().map(|m| m.to_string());
                        Value::String(msg.unwrap_or_else(|| e.code.to_string()))
                    })
                    .collect();
                out.insert(path, Value::Array(messages));
            }
            ValidationErrorsKind::Struct(inner) => collect_details(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_details(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    fn english() -> (Locale, I18nStore) {
        (Locale("en".into()), I18nStore::load_embedded().unwrap())
    }

    #[test]
    fn taxonomy_maps_to_http_statuses() {
        assert_eq!(AppError::Unauthenticated.status_and_key().0, StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Forbidden("forbidden.cross_tenant").status_and_key().0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::UserNotFound.status_and_key().0, StatusCode::NOT_FOUND);
        assert_eq!(AppError::EmailAlreadyExists.status_and_key().0, StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status_and_key().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let (locale, i18n) = english();
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"))
            .to_api_error(&locale, &i18n);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
        assert!(!api.error.contains("hunter2"));
    }

    #[test]
    fn duplicate_email_reads_already_exists() {
        let (locale, i18n) = english();
        let api = AppError::EmailAlreadyExists.to_api_error(&locale, &i18n);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.error.contains("already exists"));
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let (locale, i18n) = english();
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("required");
        err.message = Some("Student ID is required for students".into());
        errors.add("studentId", err);

        let api = AppError::ValidationError(errors).to_api_error(&locale, &i18n);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["studentId"][0], "Student ID is required for students");
    }
}
