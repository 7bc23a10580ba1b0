// src/services/auth.rs

use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, SessionUser, User},
};

// Validade do "state" do OAuth (ida e volta no Google)
const OAUTH_STATE_TTL_MINUTES: i64 = 10;
const OAUTH_STATE_PURPOSE: &str = "google_oauth_state";

// O "state" do OAuth é um JWT curto assinado com o mesmo segredo.
// Não tem `sub`, então nunca serve como sessão (e vice-versa).
#[derive(Debug, Serialize, Deserialize)]
struct OAuthStateClaims {
    purpose: String,
    nonce: Uuid,
    exp: usize,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    ttl_hours: i64,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, ttl_hours: i64) -> Self {
        Self { user_repo, jwt_secret, ttl_hours }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Usuário criado só pelo Google não tem senha
        let password_hash = user.password_hash.clone().ok_or(AppError::InvalidCredentials)?;
        let password_clone = password.to_owned();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// A linha atual do dono da sessão.
    /// Usuário apagado (ex.: cadastro rejeitado) perde a sessão.
    pub async fn current_user(&self, session: &SessionUser) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(session.id)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    /// Relê o usuário e emite um token com cargo/estado atuais.
    pub async fn refresh(&self, session: &SessionUser) -> Result<(String, User), AppError> {
        let user = self.current_user(session).await?;
        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Token -> sessão materializada. Qualquer falha vira InvalidToken.
    pub fn decode_session(&self, token: &str) -> Result<SessionUser, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(SessionUser::from(token_data.claims))
    }

    /// Copia a linha do usuário para as claims da sessão.
    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.ttl_hours);

        let claims = Claims {
            sub: user.id,
            tenant_id: user.tenant_id,
            role: user.role,
            state: user.state,
            google_id: user.google_id.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    pub fn issue_oauth_state(&self) -> Result<String, AppError> {
        let claims = OAuthStateClaims {
            purpose: OAUTH_STATE_PURPOSE.to_string(),
            nonce: Uuid::new_v4(),
            exp: (Utc::now() + Duration::minutes(OAUTH_STATE_TTL_MINUTES)).timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    pub fn verify_oauth_state(&self, state: &str) -> Result<(), AppError> {
        let data = decode::<OAuthStateClaims>(
            state,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::BadRequest("auth.invalid_oauth_state"))?;

        if data.claims.purpose != OAUTH_STATE_PURPOSE {
            return Err(AppError::BadRequest("auth.invalid_oauth_state"));
        }
        Ok(())
    }
}
