// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::extract::FromRef;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{AccountRequestRepository, CampusRepository, EventRepository, TenantRepository, UserRepository},
    services::{
        account_service::AccountService,
        auth::AuthService,
        calendar_service::CalendarService,
        event_service::EventService,
        identity_service::IdentityService,
        notification_service::{LogTransport, MailTransport, NotificationService, SmtpMailTransport},
        oauth::GoogleOAuth,
        onboarding_service::OnboardingService,
        tenancy_service::TenantService,
        user_admin_service::UserAdminService,
    },
};

#[derive(Clone, Debug)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

/// Tudo que vem do ambiente (.env).
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub default_tenant_slug: String,
    pub institutional_email_domain: Option<String>,
    pub google: Option<GoogleConfig>,
    pub smtp: Option<SmtpConfig>,
    pub calendar_max_events: i64,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{} deve ser definida", name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(name) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} tem um valor inválido: '{}'", name, raw)),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // Google só liga com as três variáveis presentes
        let google = match (
            optional("GOOGLE_CLIENT_ID"),
            optional("GOOGLE_CLIENT_SECRET"),
            optional("GOOGLE_REDIRECT_URL"),
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_url)) => Some(GoogleConfig {
                client_id,
                client_secret,
                redirect_url,
            }),
            _ => None,
        };

        let smtp = match (optional("SMTP_HOST"), optional("MAIL_FROM")) {
            (Some(host), Some(from)) => Some(SmtpConfig {
                host,
                port: parsed_or("SMTP_PORT", 587)?,
                username: optional("SMTP_USERNAME"),
                password: optional("SMTP_PASSWORD"),
                from,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", 5)?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_hours: parsed_or("JWT_TTL_HOURS", 168)?,
            default_tenant_slug: optional("DEFAULT_TENANT_SLUG").unwrap_or_else(|| "default".to_string()),
            institutional_email_domain: optional("INSTITUTIONAL_EMAIL_DOMAIN")
                .map(|d| d.trim_start_matches('@').to_ascii_lowercase()),
            google,
            smtp,
            calendar_max_events: parsed_or("CALENDAR_MAX_EVENTS", 500)?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub identity_service: IdentityService,
    pub tenant_service: TenantService,
    pub user_admin_service: UserAdminService,
    pub onboarding_service: OnboardingService,
    pub account_service: AccountService,
    pub calendar_service: CalendarService,
    pub event_service: EventService,
    pub google_oauth: Option<GoogleOAuth>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_pool(config, db_pool)
    }

    /// Monta o gráfico de dependências em cima de uma pool já criada.
    pub fn with_pool(config: AppConfig, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load_embedded()?);

        let transport: Arc<dyn MailTransport> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpMailTransport::new(smtp)?),
            None => {
                tracing::warn!("📭 SMTP não configurado: e-mails serão apenas registrados no log.");
                Arc::new(LogTransport)
            }
        };
        let notifier = NotificationService::new(transport);

        let google_oauth = config.google.as_ref().map(GoogleOAuth::new).transpose()?;

        // --- Repositórios ---
        let user_repo = UserRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let campus_repo = CampusRepository::new(db_pool.clone());
        let event_repo = EventRepository::new(db_pool.clone());
        let request_repo = AccountRequestRepository::new(db_pool.clone());

        // --- Serviços ---
        let tenant_service = TenantService::new(
            tenant_repo.clone(),
            db_pool.clone(),
            config.default_tenant_slug.clone(),
        );
        let auth_service = AuthService::new(
            user_repo.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_hours,
        );
        let identity_service = IdentityService::new(
            user_repo.clone(),
            tenant_service.clone(),
            notifier.clone(),
            db_pool.clone(),
            config.institutional_email_domain.clone(),
        );
        let user_admin_service =
            UserAdminService::new(user_repo.clone(), notifier.clone(), db_pool.clone());
        let onboarding_service = OnboardingService::new(
            user_repo.clone(),
            tenant_repo.clone(),
            campus_repo.clone(),
            db_pool.clone(),
        );
        let account_service = AccountService::new(
            user_repo.clone(),
            request_repo,
            tenant_service.clone(),
            notifier.clone(),
            db_pool.clone(),
        );
        let calendar_service = CalendarService::new(event_repo.clone(), config.calendar_max_events);
        let event_service = EventService::new(event_repo, campus_repo, db_pool.clone());

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            identity_service,
            tenant_service,
            user_admin_service,
            onboarding_service,
            account_service,
            calendar_service,
            event_service,
            google_oauth,
        })
    }
}

impl FromRef<AppState> for Arc<I18nStore> {
    fn from_ref(state: &AppState) -> Self {
        state.i18n_store.clone()
    }
}

#[cfg(test)]
impl AppConfig {
    /// Configuração fixa dos testes: sem Google e sem SMTP.
    pub fn for_tests() -> Self {
        AppConfig {
            database_url: "postgres://localhost/campus_test".into(),
            db_max_connections: 1,
            bind_addr: "127.0.0.1:0".into(),
            jwt_secret: "segredo-de-teste".into(),
            jwt_ttl_hours: 1,
            default_tenant_slug: "default".into(),
            institutional_email_domain: Some("college.edu".into()),
            google: None,
            smtp: None,
            calendar_max_events: 500,
        }
    }
}
