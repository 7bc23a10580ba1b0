// src/services/user_admin_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        auth::{ApproveUserPayload, SessionUser, UpdateUserPayload, User, UserState},
        rbac::Role,
    },
    services::notification_service::NotificationService,
};

/// Regras de alteração de um usuário por um admin, na ordem:
/// mesma faculdade; cargo novo abaixo do ator; cargo atual abaixo do ator; transição válida.
pub fn check_user_update(
    actor: &SessionUser,
    target: &User,
    new_role: Option<Role>,
    new_state: Option<UserState>,
) -> Result<(), AppError> {
    if target.tenant_id != actor.tenant_id {
        return Err(AppError::Forbidden("forbidden.cross_tenant"));
    }

    if let Some(role) = new_role {
        if !actor.role.can_manage(role) {
            return Err(AppError::Forbidden("forbidden.role_too_high"));
        }
    }

    if !actor.role.can_manage(target.role) {
        return Err(AppError::Forbidden("forbidden.target_too_high"));
    }

    if let Some(state) = new_state {
        if !target.state.can_transition_to(state) {
            return Err(AppError::BadRequest("user.invalid_transition"));
        }
    }

    Ok(())
}

/// Aprovação só vale para cadastros PENDING da mesma faculdade,
/// com o ator acima do cargo atual e do cargo atribuído.
pub fn check_approval(
    actor: &SessionUser,
    target: &User,
    role_override: Option<Role>,
) -> Result<(), AppError> {
    if target.tenant_id != actor.tenant_id {
        return Err(AppError::Forbidden("forbidden.cross_tenant"));
    }
    if let Some(role) = role_override {
        if !actor.role.can_manage(role) {
            return Err(AppError::Forbidden("forbidden.role_too_high"));
        }
    }
    if !actor.role.can_manage(target.role) {
        return Err(AppError::Forbidden("forbidden.target_too_high"));
    }
    if target.state != UserState::Pending {
        return Err(AppError::BadRequest("user.not_pending"));
    }
    Ok(())
}

#[derive(Debug)]
pub enum ApprovalOutcome {
    Approved(User),
    Rejected,
}

#[derive(Clone)]
pub struct UserAdminService {
    user_repo: UserRepository,
    notifier: NotificationService,
    pool: PgPool,
}

impl UserAdminService {
    pub fn new(user_repo: UserRepository, notifier: NotificationService, pool: PgPool) -> Self {
        Self { user_repo, notifier, pool }
    }

    pub async fn list_pending(&self, actor: &SessionUser) -> Result<Vec<User>, AppError> {
        self.user_repo.list_pending(actor.tenant_id).await
    }

    pub async fn update_user(
        &self,
        actor: &SessionUser,
        target_id: Uuid,
        payload: &UpdateUserPayload,
    ) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let target = self
            .user_repo
            .find_by_id_for_update(&mut *tx, target_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        check_user_update(actor, &target, payload.role, payload.state)?;

        let updated = self
            .user_repo
            .update_role_state(&mut *tx, target.id, payload.role, payload.state)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "👤 {} alterou {}: {} / {:?} -> {} / {:?}",
            actor.id,
            updated.email,
            target.role,
            target.state,
            updated.role,
            updated.state
        );

        if target.state == UserState::Pending && updated.state == UserState::Active {
            self.notifier.account_approved(&updated).await;
        }

        Ok(updated)
    }

    pub async fn approve_user(
        &self,
        actor: &SessionUser,
        target_id: Uuid,
        payload: &ApproveUserPayload,
    ) -> Result<ApprovalOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let target = self
            .user_repo
            .find_by_id_for_update(&mut *tx, target_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        check_approval(actor, &target, payload.role)?;

        if !payload.approved {
            self.user_repo.delete_user(&mut *tx, target.id).await?;
            tx.commit().await?;
            tracing::info!("🗑️ Cadastro de {} rejeitado por {}", target.email, actor.id);
            return Ok(ApprovalOutcome::Rejected);
        }

        let role = payload.role.unwrap_or(target.role);
        let approved = self
            .user_repo
            .update_role_state(&mut *tx, target.id, Some(role), Some(UserState::Active))
            .await?;

        tx.commit().await?;
        tracing::info!("✅ {} aprovado como {} por {}", approved.email, approved.role, actor.id);

        self.notifier.account_approved(&approved).await;

        Ok(ApprovalOutcome::Approved(approved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use chrono::Utc;

    fn actor(role: Role, tenant_id: Uuid) -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            tenant_id,
            role,
            state: UserState::Active,
            google_id: None,
        }
    }

    fn target(role: Role, state: UserState, tenant_id: Uuid) -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id,
            email: "alvo@college.edu".into(),
            name: "Alvo".into(),
            image: None,
            phone: None,
            google_id: None,
            password_hash: None,
            role,
            state,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn key(result: Result<(), AppError>) -> &'static str {
        result.unwrap_err().status_and_key().1
    }

    #[test]
    fn org_admin_can_approve_a_pending_member() {
        let tenant = Uuid::new_v4();
        let admin = actor(Role::OrgAdmin, tenant);
        let member = target(Role::ClubMember, UserState::Pending, tenant);
        assert!(
            check_user_update(&admin, &member, Some(Role::DeptCoord), Some(UserState::Active)).is_ok()
        );
    }

    #[test]
    fn other_tenants_are_off_limits() {
        let admin = actor(Role::OrgAdmin, Uuid::new_v4());
        let member = target(Role::ClubMember, UserState::Pending, Uuid::new_v4());
        assert_eq!(key(check_user_update(&admin, &member, None, None)), "forbidden.cross_tenant");
        assert_eq!(key(check_approval(&admin, &member, None)), "forbidden.cross_tenant");
    }

    #[test]
    fn cannot_assign_a_role_at_or_above_your_own() {
        let tenant = Uuid::new_v4();
        let admin = actor(Role::OrgAdmin, tenant);
        let member = target(Role::ClubMember, UserState::Active, tenant);
        assert_eq!(
            key(check_user_update(&admin, &member, Some(Role::OrgAdmin), None)),
            "forbidden.role_too_high"
        );
    }

    #[test]
    fn cannot_touch_peers_or_superiors() {
        let tenant = Uuid::new_v4();
        let admin = actor(Role::OrgAdmin, tenant);
        let peer = target(Role::OrgAdmin, UserState::Active, tenant);
        assert_eq!(
            key(check_user_update(&admin, &peer, None, Some(UserState::Suspended))),
            "forbidden.target_too_high"
        );
    }

    #[test]
    fn backwards_state_transitions_are_rejected() {
        let tenant = Uuid::new_v4();
        let admin = actor(Role::SuperAdmin, tenant);
        let suspended = target(Role::ClubMember, UserState::Suspended, tenant);
        assert_eq!(
            key(check_user_update(&admin, &suspended, None, Some(UserState::Active))),
            "user.invalid_transition"
        );

        let active = target(Role::ClubMember, UserState::Active, tenant);
        assert_eq!(
            key(check_user_update(&admin, &active, None, Some(UserState::Pending))),
            "user.invalid_transition"
        );
    }

    #[test]
    fn only_pending_users_can_be_approved() {
        let tenant = Uuid::new_v4();
        let admin = actor(Role::OrgAdmin, tenant);
        let active = target(Role::ClubMember, UserState::Active, tenant);
        assert_eq!(key(check_approval(&admin, &active, None)), "user.not_pending");

        let pending = target(Role::ClubMember, UserState::Pending, tenant);
        assert!(check_approval(&admin, &pending, None).is_ok());
        assert!(check_approval(&admin, &pending, Some(Role::DeptCoord)).is_ok());
    }

    #[test]
    fn pending_peers_cannot_be_approved_by_an_equal() {
        let tenant = Uuid::new_v4();
        let admin = actor(Role::OrgAdmin, tenant);
        let peer = target(Role::OrgAdmin, UserState::Pending, tenant);
        assert_eq!(key(check_approval(&admin, &peer, None)), "forbidden.target_too_high");
        assert_eq!(
            key(check_approval(&admin, &peer, Some(Role::ClubMember))),
            "forbidden.target_too_high"
        );

        let owner = actor(Role::SuperAdmin, tenant);
        assert!(check_approval(&owner, &peer, None).is_ok());
    }

    #[test]
    fn approval_cannot_grant_a_role_at_or_above_the_actor() {
        let tenant = Uuid::new_v4();
        let coord = actor(Role::DeptCoord, tenant);
        let member = target(Role::ClubMember, UserState::Pending, tenant);
        assert_eq!(
            key(check_approval(&coord, &member, Some(Role::DeptCoord))),
            "forbidden.role_too_high"
        );

        let admin = actor(Role::OrgAdmin, tenant);
        assert_eq!(
            key(check_approval(&admin, &member, Some(Role::OrgAdmin))),
            "forbidden.role_too_high"
        );
    }

    async fn approve(
        state: &crate::config::AppState,
        admin: &User,
        target: &User,
        approved: bool,
        role: Option<Role>,
    ) -> Result<ApprovalOutcome, AppError> {
        state
            .user_admin_service
            .approve_user(&SessionUser::from(admin), target.id, &ApproveUserPayload { approved, role })
            .await
    }

    #[sqlx::test]
    async fn approval_keeps_the_current_role(pool: PgPool) -> anyhow::Result<()> {
        let state = fixtures::app_state(pool.clone());
        let tenant = state.tenant_service.default_tenant().await?;
        let admin = fixtures::user(&pool, tenant.id, "it@college.edu", Role::OrgAdmin, UserState::Active).await?;
        let coord = fixtures::user(&pool, tenant.id, "coord@college.edu", Role::DeptCoord, UserState::Pending).await?;

        let ApprovalOutcome::Approved(user) = approve(&state, &admin, &coord, true, None).await? else {
            panic!("esperava aprovação");
        };
        assert_eq!(user.role, Role::DeptCoord);
        assert_eq!(user.state, UserState::Active);
        Ok(())
    }

    #[sqlx::test]
    async fn approval_can_override_the_role(pool: PgPool) -> anyhow::Result<()> {
        let state = fixtures::app_state(pool.clone());
        let tenant = state.tenant_service.default_tenant().await?;
        let admin = fixtures::user(&pool, tenant.id, "it@college.edu", Role::OrgAdmin, UserState::Active).await?;
        let member = fixtures::user(&pool, tenant.id, "club@gmail.com", Role::ClubMember, UserState::Pending).await?;

        let outcome = approve(&state, &admin, &member, true, Some(Role::ResourceManager)).await?;
        let ApprovalOutcome::Approved(user) = outcome else {
            panic!("esperava aprovação");
        };
        assert_eq!(user.role, Role::ResourceManager);
        assert_eq!(user.state, UserState::Active);
        Ok(())
    }

    #[sqlx::test]
    async fn a_pending_peer_is_left_untouched(pool: PgPool) -> anyhow::Result<()> {
        let state = fixtures::app_state(pool.clone());
        let tenant = state.tenant_service.default_tenant().await?;
        let admin = fixtures::user(&pool, tenant.id, "it@college.edu", Role::OrgAdmin, UserState::Active).await?;
        let peer = fixtures::user(&pool, tenant.id, "it2@college.edu", Role::OrgAdmin, UserState::Pending).await?;

        let err = approve(&state, &admin, &peer, true, Some(Role::ClubMember)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden("forbidden.target_too_high")));

        let err = approve(&state, &admin, &peer, false, None).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden("forbidden.target_too_high")));

        let unchanged = UserRepository::new(pool.clone()).find_by_id(peer.id).await?.unwrap();
        assert_eq!((unchanged.role, unchanged.state), (Role::OrgAdmin, UserState::Pending));
        Ok(())
    }

    #[sqlx::test]
    async fn rejection_removes_the_pending_user(pool: PgPool) -> anyhow::Result<()> {
        let state = fixtures::app_state(pool.clone());
        let tenant = state.tenant_service.default_tenant().await?;
        let admin = fixtures::user(&pool, tenant.id, "it@college.edu", Role::OrgAdmin, UserState::Active).await?;
        let member = fixtures::user(&pool, tenant.id, "club@gmail.com", Role::ClubMember, UserState::Pending).await?;

        let outcome = approve(&state, &admin, &member, false, None).await?;
        assert!(matches!(outcome, ApprovalOutcome::Rejected));
        assert!(UserRepository::new(pool.clone()).find_by_id(member.id).await?.is_none());
        Ok(())
    }
}
