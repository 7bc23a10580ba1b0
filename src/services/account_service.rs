// src/services/account_service.rs

use bcrypt::hash;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccountRequestRepository, NewUser, UserRepository},
    models::{
        account_request::{
            AccountRequest, AccountRequestPayload, AccountRequestStatus, RequestAccountPayload,
            ReviewAccountRequestPayload, ReviewAction,
        },
        auth::{SessionUser, User, UserState},
        rbac::Role,
    },
    services::{notification_service::NotificationService, tenancy_service::TenantService},
};

/// Quem revisa um pedido: mesma faculdade, pedido em aberto e,
/// para aprovar, cargo acima do cargo pedido.
pub fn check_review(
    actor: &SessionUser,
    request: &AccountRequest,
    action: ReviewAction,
) -> Result<(), AppError> {
    if request.tenant_id != actor.tenant_id {
        return Err(AppError::Forbidden("forbidden.cross_tenant"));
    }
    if !request.status.is_open() {
        return Err(AppError::BadRequest("account_request.closed"));
    }
    if action == ReviewAction::Approve && !actor.role.can_manage(request.requested_role) {
        return Err(AppError::Forbidden("forbidden.role_too_high"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    request_repo: AccountRequestRepository,
    tenant_service: TenantService,
    notifier: NotificationService,
    pool: PgPool,
}

impl AccountService {
    pub fn new(
        user_repo: UserRepository,
        request_repo: AccountRequestRepository,
        tenant_service: TenantService,
        notifier: NotificationService,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, request_repo, tenant_service, notifier, pool }
    }

    // Roda depois da gravação: uma falha aqui só custa o aviso.
    async fn admins_to_notify(&self, tenant_id: Uuid, roles: &[Role]) -> Vec<User> {
        match self.user_repo.list_active_with_roles(tenant_id, roles).await {
            Ok(admins) => admins,
            Err(e) => {
                tracing::warn!("⚠️ Não foi possível buscar os admins para o aviso: {}", e);
                Vec::new()
            }
        }
    }

    async fn ensure_email_is_free(&self, email: &str) -> Result<(), AppError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }
        Ok(())
    }

    /// Auto-cadastro simples: já nasce um CLUB_MEMBER PENDING no tenant padrão.
    pub async fn request_account(&self, payload: &RequestAccountPayload) -> Result<User, AppError> {
        let email = payload.email.trim().to_lowercase();
        self.ensure_email_is_free(&email).await?;

        // Hashing fora da transação (e fora do runtime async)
        let password_hash = match payload.password.clone() {
            Some(password) => Some(
                tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                    .await
                    .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??,
            ),
            None => None,
        };

        let tenant = self.tenant_service.default_tenant().await?;

        // Se outro cadastro com o mesmo e-mail passar na frente, o repo devolve EmailAlreadyExists
        let user = self
            .user_repo
            .create_user(
                &self.pool,
                NewUser {
                    tenant_id: tenant.id,
                    email: &email,
                    name: payload.name.trim(),
                    image: None,
                    phone: payload.phone.as_deref(),
                    google_id: None,
                    password_hash: password_hash.as_deref(),
                    role: Role::ClubMember,
                    state: UserState::Pending,
                },
            )
            .await?;

        tracing::info!(
            "📝 Pedido de conta de {} (clube: {}): {}",
            user.email,
            payload.club_name.as_deref().unwrap_or("-"),
            payload.purpose
        );

        let admins = self.admins_to_notify(tenant.id, &[Role::OrgAdmin]).await;
        self.notifier.new_user_signup(&admins, &user).await;

        Ok(user)
    }

    /// Pedido estruturado: só grava o registro; a conta nasce na aprovação.
    pub async fn submit_request(
        &self,
        payload: &AccountRequestPayload,
    ) -> Result<AccountRequest, AppError> {
        payload.validate_identifiers()?;
        self.ensure_email_is_free(payload.email.trim()).await?;

        let tenant = self.tenant_service.default_tenant().await?;
        let request = self.request_repo.create(tenant.id, payload).await?;

        tracing::info!("📝 Pedido de conta {} recebido de {}", request.id, request.email);

        let admins = self
            .admins_to_notify(tenant.id, &[Role::SuperAdmin, Role::OrgAdmin])
            .await;
        self.notifier.account_request_received(&admins, &request).await;
        self.notifier.account_request_confirmation(&request).await;

        Ok(request)
    }

    pub async fn list_requests(
        &self,
        actor: &SessionUser,
        status: Option<AccountRequestStatus>,
    ) -> Result<Vec<AccountRequest>, AppError> {
        self.request_repo.list(actor.tenant_id, status).await
    }

    pub async fn review_request(
        &self,
        actor: &SessionUser,
        request_id: Uuid,
        payload: &ReviewAccountRequestPayload,
    ) -> Result<AccountRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self
            .request_repo
            .find_by_id_for_update(&mut *tx, request_id)
            .await?
            .ok_or(AppError::NotFound("account_request.not_found"))?;

        check_review(actor, &request, payload.action)?;

        if payload.action == ReviewAction::Approve {
            let name = request.full_name();
            self.user_repo
                .create_user(
                    &mut *tx,
                    NewUser {
                        tenant_id: request.tenant_id,
                        email: &request.email,
                        name: &name,
                        image: None,
                        phone: Some(&request.phone_number),
                        google_id: None,
                        password_hash: None,
                        role: request.requested_role,
                        state: UserState::Active,
                    },
                )
                .await?;
        }

        let reviewed = self
            .request_repo
            .record_review(
                &mut *tx,
                request.id,
                payload.action.resulting_status(),
                payload.comment.as_deref(),
                actor.id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "📋 Pedido {} revisado por {}: {:?}",
            reviewed.id,
            actor.id,
            reviewed.status
        );

        self.notifier.account_request_reviewed(&reviewed).await;

        Ok(reviewed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::fixtures, models::account_request::AccountUserType};
    use chrono::Utc;

    fn actor(role: Role, tenant_id: Uuid) -> SessionUser {
        SessionUser { id: Uuid::new_v4(), tenant_id, role, state: UserState::Active, google_id: None }
    }

    fn request(tenant_id: Uuid, status: AccountRequestStatus, requested_role: Role) -> AccountRequest {
        AccountRequest {
            id: Uuid::new_v4(),
            tenant_id,
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@student.college.edu".into(),
            phone_number: "+1234567890".into(),
            user_type: AccountUserType::Student,
            student_id: Some("STU001".into()),
            employee_id: None,
            year: None,
            semester: None,
            department: "Computer Science".into(),
            course: None,
            designation: None,
            reason_for_access: "Final year project labs".into(),
            intended_use: "Evening lab bookings".into(),
            requested_role,
            status,
            review_comment: None,
            reviewed_by: None,
            reviewed_at: None,
            submitted_at: Utc::now(),
        }
    }

    fn key(result: Result<(), AppError>) -> &'static str {
        result.unwrap_err().status_and_key().1
    }

    #[test]
    fn open_requests_in_the_same_tenant_can_be_reviewed() {
        let tenant = Uuid::new_v4();
        let admin = actor(Role::OrgAdmin, tenant);
        let pending = request(tenant, AccountRequestStatus::Pending, Role::ClubMember);
        let clarifying = request(tenant, AccountRequestStatus::UnderReview, Role::DeptCoord);

        assert!(check_review(&admin, &pending, ReviewAction::Approve).is_ok());
        assert!(check_review(&admin, &clarifying, ReviewAction::Reject).is_ok());
    }

    #[test]
    fn closed_requests_are_final() {
        let tenant = Uuid::new_v4();
        let admin = actor(Role::OrgAdmin, tenant);
        let done = request(tenant, AccountRequestStatus::Approved, Role::ClubMember);
        assert_eq!(key(check_review(&admin, &done, ReviewAction::Clarify)), "account_request.closed");
    }

    #[test]
    fn requests_from_other_tenants_are_forbidden() {
        let admin = actor(Role::SuperAdmin, Uuid::new_v4());
        let foreign = request(Uuid::new_v4(), AccountRequestStatus::Pending, Role::ClubMember);
        assert_eq!(key(check_review(&admin, &foreign, ReviewAction::Reject)), "forbidden.cross_tenant");
    }

    #[test]
    fn approving_needs_to_outrank_the_requested_role() {
        let tenant = Uuid::new_v4();
        let coord = actor(Role::DeptCoord, tenant);
        let wants_coord = request(tenant, AccountRequestStatus::Pending, Role::DeptCoord);
        assert_eq!(
            key(check_review(&coord, &wants_coord, ReviewAction::Approve)),
            "forbidden.role_too_high"
        );
        // Rejeitar não depende de hierarquia
        assert!(check_review(&coord, &wants_coord, ReviewAction::Reject).is_ok());
    }

    fn signup(email: &str) -> RequestAccountPayload {
        RequestAccountPayload {
            email: email.into(),
            name: "Ana Souza".into(),
            phone: None,
            purpose: "Reservar o auditório para o clube de robótica".into(),
            club_name: Some("Robótica".into()),
            password: None,
        }
    }

    #[sqlx::test]
    async fn requesting_twice_is_refused_without_a_second_row(pool: PgPool) -> anyhow::Result<()> {
        let state = fixtures::app_state(pool.clone());

        let user = state.account_service.request_account(&signup("ana@gmail.com")).await?;
        assert_eq!((user.role, user.state), (Role::ClubMember, UserState::Pending));

        let err = state
            .account_service
            .request_account(&signup("  ANA@gmail.com "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));
        assert_eq!(err.status_and_key().0, axum::http::StatusCode::BAD_REQUEST);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind("ana@gmail.com")
            .fetch_one(&pool)
            .await?;
        assert_eq!(rows, 1);
        Ok(())
    }

    #[tokio::test]
    async fn an_unreachable_admin_lookup_only_costs_the_notice() {
        // Porta fechada: toda consulta falha, e rápido
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://campus@127.0.0.1:1/campus")
            .unwrap();
        let state = fixtures::app_state(pool);

        let admins = state
            .account_service
            .admins_to_notify(Uuid::new_v4(), &[Role::OrgAdmin])
            .await;
        assert!(admins.is_empty());
    }
}
