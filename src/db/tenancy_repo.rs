// src/db/tenancy_repo.rs

use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{campus::CollegeProfile, tenancy::Tenant},
};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    /// Devolve o tenant do slug, criando-o se ainda não existir.
    /// Só para quem está provisionando (cadastro, login); leitura usa `find_by_slug`.
    pub async fn get_or_create(
        &self,
        conn: &mut PgConnection,
        slug: &str,
        name: &str,
    ) -> Result<Tenant, AppError> {
        let inserted = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, slug)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(tenant) = inserted {
            tracing::info!("🏫 Tenant '{}' criado", tenant.slug);
            return Ok(tenant);
        }

        // Já existia (ou outra transação acabou de criar): novo snapshot enxerga a linha
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_one(&mut *conn)
            .await?;
        Ok(tenant)
    }

    /// Grava o perfil preenchido no onboarding.
    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        profile: &CollegeProfile,
    ) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET name = $2, address = $3, city = $4,
                contact_email = $5, contact_phone = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&profile.name)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(&profile.contact_email)
        .bind(&profile.contact_phone)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            // Duas faculdades não podem ter o mesmo nome
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() && db_err.constraint() == Some("tenants_name_key") {
                    return AppError::Conflict("tenant.name_taken");
                }
            }
            e.into()
        })?
        .ok_or(AppError::NotFound("tenant.not_found"))
    }
}
