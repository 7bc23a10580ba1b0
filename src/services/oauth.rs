// src/services/oauth.rs

use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, RedirectUrl, Scope, TokenResponse, TokenUrl,
};

use crate::{common::error::AppError, config::GoogleConfig, models::auth::ExternalProfile};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

pub type OauthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[derive(Clone)]
pub struct GoogleOAuth {
    client: OauthClient,
    http: reqwest::Client,
}

impl GoogleOAuth {
    pub fn new(config: &GoogleConfig) -> anyhow::Result<Self> {
        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.to_string())?)
            .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?)
            .set_redirect_uri(RedirectUrl::new(config.redirect_url.clone())?);

        // Seguir redirects abre espaço para SSRF
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client, http })
    }

    /// URL de consentimento do Google usando o `state` já assinado.
    pub fn authorize_url(&self, state: String) -> String {
        let (url, _) = self
            .client
            .authorize_url(move || CsrfToken::new(state))
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .url();
        url.to_string()
    }

    /// Troca o code pelo access token e busca o perfil.
    /// Qualquer falha do lado do Google recusa o login.
    pub async fn fetch_profile(&self, code: &str) -> Result<ExternalProfile, AppError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| {
                tracing::warn!("🔑 Troca do código OAuth falhou: {}", e);
                AppError::SignInRejected
            })?;

        let profile = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                tracing::warn!("🔑 Falha ao buscar o perfil no Google: {}", e);
                AppError::SignInRejected
            })?
            .json::<ExternalProfile>()
            .await
            .map_err(|e| {
                tracing::warn!("🔑 Perfil do Google em formato inesperado: {}", e);
                AppError::SignInRejected
            })?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_our_state_and_scopes() {
        let google = GoogleOAuth::new(&GoogleConfig {
            client_id: "client-123".into(),
            client_secret: "shh".into(),
            redirect_url: "http://localhost:3000/auth/google/callback".into(),
        })
        .unwrap();

        let url = google.authorize_url("estado-assinado".into());
        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("state=estado-assinado"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("email"));
    }
}
