// src/services/identity_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{NewUser, UserRepository},
    models::{
        auth::{ExternalProfile, User, UserState},
        rbac::Role,
    },
    services::{notification_service::NotificationService, tenancy_service::TenantService},
};

// Chave do advisory lock que serializa os logins externos
// (o "primeiro usuário" só pode ser decidido uma vez).
const SIGN_IN_LOCK_KEY: i64 = 0x5349_474e_494e;

/// O que fazer com um login externo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInPlan {
    /// Cria o usuário como PENDING com este cargo.
    Provision { role: Role, notify_admins: bool },
    /// Usuário já existe mas ainda não tem google_id.
    LinkGoogleId,
    /// Usuário já existe e está completo.
    Unchanged,
}

/// `true` se o e-mail é do domínio (ou de um subdomínio dele). Sem diferenciar maiúsculas.
pub fn email_in_domain(email: &str, domain: &str) -> bool {
    let Some((_, email_domain)) = email.rsplit_once('@') else {
        return false;
    };
    let email_domain = email_domain.to_ascii_lowercase();
    let domain = domain.trim_start_matches('@').to_ascii_lowercase();

    !domain.is_empty()
        && (email_domain == domain || email_domain.ends_with(&format!(".{}", domain)))
}

/// Política de provisionamento, na ordem:
/// ninguém cadastrado -> ORG_ADMIN; domínio institucional -> DEPT_COORD;
/// resto -> CLUB_MEMBER + aviso aos admins. Usuário existente só ganha o google_id.
pub fn plan_sign_in(
    existing: Option<&User>,
    any_user_exists: bool,
    email: &str,
    institutional_domain: Option<&str>,
) -> SignInPlan {
    if let Some(user) = existing {
        return if user.google_id.is_none() {
            SignInPlan::LinkGoogleId
        } else {
            SignInPlan::Unchanged
        };
    }

    if !any_user_exists {
        return SignInPlan::Provision { role: Role::OrgAdmin, notify_admins: false };
    }

    if institutional_domain.is_some_and(|domain| email_in_domain(email, domain)) {
        return SignInPlan::Provision { role: Role::DeptCoord, notify_admins: false };
    }

    SignInPlan::Provision { role: Role::ClubMember, notify_admins: true }
}

#[derive(Clone)]
pub struct IdentityService {
    user_repo: UserRepository,
    tenant_service: TenantService,
    notifier: NotificationService,
    pool: PgPool,
    institutional_domain: Option<String>,
}

impl IdentityService {
    pub fn new(
        user_repo: UserRepository,
        tenant_service: TenantService,
        notifier: NotificationService,
        pool: PgPool,
        institutional_domain: Option<String>,
    ) -> Self {
        Self { user_repo, tenant_service, notifier, pool, institutional_domain }
    }

    /// Resolve (ou cria) o usuário de um login externo.
    /// Erro de banco aborta o login: o cliente recebe 401 e o detalhe fica no log.
    pub async fn resolve_sign_in(&self, profile: &ExternalProfile) -> Result<User, AppError> {
        let (user, plan) = self.apply_sign_in(profile).await.map_err(|e| match e {
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                tracing::error!("❌ Falha ao resolver login de {}: {}", profile.email, e);
                AppError::SignInRejected
            }
            other => other,
        })?;

        match plan {
            SignInPlan::Provision { notify_admins, .. } => {
                tracing::info!("🆕 Novo usuário {} ({}) aguardando aprovação", user.email, user.role);
                if notify_admins {
                    self.notify_admins(&user).await;
                }
            }
            SignInPlan::LinkGoogleId => {
                tracing::info!("🔗 Conta Google vinculada a {}", user.email);
            }
            SignInPlan::Unchanged => {}
        }

        Ok(user)
    }

    async fn apply_sign_in(&self, profile: &ExternalProfile) -> Result<(User, SignInPlan), AppError> {
        let email = profile.email.trim().to_lowercase();

        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SIGN_IN_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let existing = self.user_repo.find_by_email_with(&mut *tx, &email).await?;
        let any_user_exists = self.user_repo.any_user_exists(&mut *tx).await?;

        let plan = plan_sign_in(
            existing.as_ref(),
            any_user_exists,
            &email,
            self.institutional_domain.as_deref(),
        );

        let user = match (plan, existing) {
            (SignInPlan::Provision { role, .. }, _) => {
                let tenant = self.tenant_service.default_tenant_with(&mut *tx).await?;
                let name = profile.name.as_deref().unwrap_or(&email);

                self.user_repo
                    .create_user(
                        &mut *tx,
                        NewUser {
                            tenant_id: tenant.id,
                            email: &email,
                            name,
                            image: profile.avatar.as_deref(),
                            phone: None,
                            google_id: Some(&profile.subject),
                            password_hash: None,
                            role,
                            state: UserState::Pending,
                        },
                    )
                    .await?
            }
            (SignInPlan::LinkGoogleId, Some(user)) => {
                self.user_repo.set_google_id(&mut *tx, user.id, &profile.subject).await?
            }
            (_, Some(user)) => user,
            (_, None) => return Err(AppError::SignInRejected),
        };

        tx.commit().await?;
        Ok((user, plan))
    }

    async fn notify_admins(&self, new_user: &User) {
        match self
            .user_repo
            .list_active_with_roles(new_user.tenant_id, &[Role::OrgAdmin])
            .await
        {
            Ok(admins) => self.notifier.new_user_signup(&admins, new_user).await,
            Err(e) => tracing::warn!("⚠️ Não foi possível buscar os admins para o aviso: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn existing(google_id: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            email: "ana@college.edu".into(),
            name: "Ana".into(),
            image: None,
            phone: None,
            google_id: google_id.map(String::from),
            password_hash: None,
            role: Role::DeptHod,
            state: UserState::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn very_first_user_becomes_org_admin() {
        let plan = plan_sign_in(None, false, "anyone@gmail.com", Some("college.edu"));
        assert_eq!(plan, SignInPlan::Provision { role: Role::OrgAdmin, notify_admins: false });
    }

    #[test]
    fn institutional_emails_become_dept_coords() {
        let plan = plan_sign_in(None, true, "prof@College.EDU", Some("college.edu"));
        assert_eq!(plan, SignInPlan::Provision { role: Role::DeptCoord, notify_admins: false });

        let sub = plan_sign_in(None, true, "prof@cs.college.edu", Some("college.edu"));
        assert_eq!(sub, SignInPlan::Provision { role: Role::DeptCoord, notify_admins: false });
    }

    #[test]
    fn everyone_else_is_a_club_member_and_admins_are_told() {
        let plan = plan_sign_in(None, true, "student@gmail.com", Some("college.edu"));
        assert_eq!(plan, SignInPlan::Provision { role: Role::ClubMember, notify_admins: true });

        let no_domain = plan_sign_in(None, true, "prof@college.edu", None);
        assert_eq!(no_domain, SignInPlan::Provision { role: Role::ClubMember, notify_admins: true });
    }

    #[test]
    fn existing_users_keep_role_and_state() {
        let without_google = existing(None);
        assert_eq!(
            plan_sign_in(Some(&without_google), true, "ana@college.edu", Some("college.edu")),
            SignInPlan::LinkGoogleId
        );

        let linked = existing(Some("g-1"));
        assert_eq!(
            plan_sign_in(Some(&linked), true, "ana@college.edu", Some("college.edu")),
            SignInPlan::Unchanged
        );
    }

    #[test]
    fn lookalike_domains_do_not_match() {
        assert!(!email_in_domain("x@notcollege.edu", "college.edu"));
        assert!(!email_in_domain("x@college.edu.evil.com", "college.edu"));
        assert!(!email_in_domain("no-at-sign", "college.edu"));
        assert!(email_in_domain("x@college.edu", "@college.edu"));
    }

    fn google(email: &str, subject: &str, name: &str) -> ExternalProfile {
        ExternalProfile {
            email: email.into(),
            subject: subject.into(),
            name: Some(name.into()),
            avatar: None,
        }
    }

    #[sqlx::test]
    async fn signing_in_again_keeps_role_and_state(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let state = crate::db::fixtures::app_state(pool.clone());
        let identity = &state.identity_service;

        // Primeiro login do sistema: ORG_ADMIN pendente
        let first = identity.resolve_sign_in(&google("it@college.edu", "g-1", "TI")).await?;
        assert_eq!((first.role, first.state), (Role::OrgAdmin, UserState::Pending));

        let repo = UserRepository::new(pool.clone());
        repo.update_role_state(&pool, first.id, None, Some(UserState::Suspended)).await?;

        let again = identity.resolve_sign_in(&google("IT@college.edu", "g-1", "Outro Nome")).await?;
        assert_eq!(again.id, first.id);
        assert_eq!((again.role, again.state), (Role::OrgAdmin, UserState::Suspended));
        Ok(())
    }

    #[sqlx::test]
    async fn linking_google_leaves_role_and_state_alone(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let state = crate::db::fixtures::app_state(pool.clone());
        let tenant = state.tenant_service.default_tenant().await?;
        let hod = crate::db::fixtures::user(&pool, tenant.id, "hod@college.edu", Role::DeptHod, UserState::Active)
            .await?;
        assert!(hod.google_id.is_none());

        let linked = state
            .identity_service
            .resolve_sign_in(&google("hod@college.edu", "g-42", "Chefe"))
            .await?;

        assert_eq!(linked.id, hod.id);
        assert_eq!(linked.google_id.as_deref(), Some("g-42"));
        assert_eq!((linked.role, linked.state), (Role::DeptHod, UserState::Active));

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&pool).await?;
        assert_eq!(users, 1);
        Ok(())
    }
}
