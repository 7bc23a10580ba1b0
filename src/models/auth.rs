// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::rbac::Role;

// --- Estado da conta (independente do cargo) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_state", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserState {
    Pending,   // Aguardando aprovação
    Active,    // Pode usar o sistema
    Suspended, // Bloqueado
}

impl UserState {
    /// Transições permitidas: PENDING -> ACTIVE, PENDING/ACTIVE -> SUSPENDED.
    /// Repetir o estado atual é um no-op e é aceito.
    pub fn can_transition_to(self, next: UserState) -> bool {
        matches!(
            (self, next),
            (UserState::Pending, UserState::Active)
                | (UserState::Pending, UserState::Suspended)
                | (UserState::Active, UserState::Suspended)
        ) || self == next
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[schema(example = "ana@college.edu")]
    pub email: String,
    #[schema(example = "Ana Souza")]
    pub name: String,
    pub image: Option<String>,
    pub phone: Option<String>,
    pub google_id: Option<String>,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: Option<String>,

    pub role: Role,
    pub state: UserState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para login por e-mail/senha
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "ana@college.edu")]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Estrutura de dados ("claims") dentro do JWT de sessão
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid, // Subject (ID do usuário)
    pub tenant_id: Uuid,
    pub role: Role,
    pub state: UserState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

/// A sessão materializada que circula pelos handlers (sem lookup global).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub role: Role,
    pub state: UserState,
    pub google_id: Option<String>,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            tenant_id: claims.tenant_id,
            role: claims.role,
            state: claims.state,
            google_id: claims.google_id,
        }
    }
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            tenant_id: user.tenant_id,
            role: user.role,
            state: user.state,
            google_id: user.google_id.clone(),
        }
    }
}

/// Perfil externo devolvido pelo provedor de identidade (Google).
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalProfile {
    pub email: String,
    #[serde(rename = "sub")]
    pub subject: String,
    pub name: Option<String>,
    #[serde(rename = "picture")]
    pub avatar: Option<String>,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    /// Rota para onde o cliente deve mandar o usuário (None = liberado).
    #[schema(example = "/pending-approval")]
    pub next_step: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: User,
    pub next_step: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthorizeResponse {
    pub authorize_url: String,
    pub state: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GoogleCallbackPayload {
    #[validate(length(min = 1, message = "O código de autorização é obrigatório."))]
    pub code: String,
    #[validate(length(min = 1, message = "O state é obrigatório."))]
    pub state: String,
}

// --- Administração de usuários ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub state: Option<UserState>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveUserPayload {
    pub approved: bool,
    /// Cargo final (CLUB_MEMBER, DEPT_COORD ou RESOURCE_MANAGER). Sem ele, fica o atual.
    #[validate(custom(function = "crate::models::account_request::validate_requestable_role"))]
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    pub message: String,
    /// Ausente quando o cadastro foi rejeitado (e apagado).
    pub user: Option<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingUsersResponse {
    pub users: Vec<User>,
}
