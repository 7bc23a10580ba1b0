// src/services/onboarding_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{CampusRepository, TenantRepository, UserRepository},
    models::{
        auth::{SessionUser, User, UserState},
        campus::{OnboardingPayload, OnboardingSummary},
        rbac::Role,
    },
};

#[derive(Clone)]
pub struct OnboardingService {
    user_repo: UserRepository,
    tenant_repo: TenantRepository,
    campus_repo: CampusRepository,
    pool: PgPool,
}

impl OnboardingService {
    pub fn new(
        user_repo: UserRepository,
        tenant_repo: TenantRepository,
        campus_repo: CampusRepository,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, tenant_repo, campus_repo, pool }
    }

    /// LÓGICA DE NEGÓCIO: grava o perfil da faculdade, a estrutura física e
    /// ativa o admin, tudo ou nada.
    pub async fn complete(
        &self,
        actor: &SessionUser,
        payload: &OnboardingPayload,
    ) -> Result<(User, OnboardingSummary), AppError> {
        if actor.state != UserState::Pending {
            return Err(AppError::Forbidden("forbidden.onboarding_closed"));
        }

        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Confere de novo no banco (o token pode estar velho)
        let admin = self
            .user_repo
            .find_by_id_for_update(&mut *tx, actor.id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if admin.state != UserState::Pending || admin.role != Role::OrgAdmin {
            return Err(AppError::Forbidden("forbidden.onboarding_closed"));
        }

        // 3. Perfil da faculdade
        self.tenant_repo
            .update_profile(&mut *tx, admin.tenant_id, &payload.college)
            .await?;

        // 4. Prédios e salas
        let mut summary = OnboardingSummary { buildings: 0, rooms: 0, departments: 0, resources: 0 };

        for building in &payload.buildings {
            let created = self
                .campus_repo
                .create_building(&mut *tx, admin.tenant_id, &building.name, building.floors)
                .await?;
            summary.buildings += 1;

            for room in &building.rooms {
                self.campus_repo.create_room(&mut *tx, created.id, room).await?;
                summary.rooms += 1;
            }
        }

        // 5. Departamentos (upsert por nome)
        for department in &payload.departments {
            self.campus_repo
                .upsert_department(&mut *tx, admin.tenant_id, &department.name, department.code.as_deref())
                .await?;
            summary.departments += 1;
        }

        // 6. Recursos
        for resource in &payload.resources {
            self.campus_repo
                .create_resource(&mut *tx, admin.tenant_id, resource)
                .await?;
            summary.resources += 1;
        }

        // 7. Admin liberado
        let admin = self
            .user_repo
            .update_role_state(&mut *tx, admin.id, None, Some(UserState::Active))
            .await?;

        // 8. Commit
        tx.commit().await?;

        tracing::info!(
            "🏫 Onboarding concluído por {}: {} prédios, {} salas, {} departamentos, {} recursos",
            admin.email,
            summary.buildings,
            summary.rooms,
            summary.departments,
            summary.resources
        );

        Ok((admin, summary))
    }
}
