// src/services/tenancy_service.rs

use sqlx::{PgConnection, PgPool};

use crate::{
    common::error::AppError,
    db::TenantRepository,
    models::tenancy::Tenant,
};

#[derive(Clone)]
pub struct TenantService {
    tenant_repo: TenantRepository,
    pool: PgPool,
    default_slug: String,
}

impl TenantService {
    pub fn new(tenant_repo: TenantRepository, pool: PgPool, default_slug: String) -> Self {
        Self { tenant_repo, pool, default_slug }
    }

    /// Nome com que o tenant padrão nasce (o onboarding troca depois).
    fn default_name(&self) -> String {
        if self.default_slug == "default" {
            "Default College".to_string()
        } else {
            format!("Default College ({})", self.default_slug)
        }
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Tenant, AppError> {
        self.tenant_repo
            .find_by_slug(slug)
            .await?
            .ok_or(AppError::NotFound("tenant.not_found"))
    }

    /// O tenant padrão, se já existir. Caminho de leitura: nunca grava.
    pub async fn find_default(&self) -> Result<Option<Tenant>, AppError> {
        self.tenant_repo.find_by_slug(&self.default_slug).await
    }

    /// O tenant padrão, criado na primeira vez que alguém precisa dele.
    pub async fn default_tenant(&self) -> Result<Tenant, AppError> {
        let mut conn = self.pool.acquire().await?;
        self.default_tenant_with(&mut conn).await
    }

    /// Mesma coisa, dentro de uma transação já aberta.
    pub async fn default_tenant_with(&self, conn: &mut PgConnection) -> Result<Tenant, AppError> {
        self.tenant_repo
            .get_or_create(conn, &self.default_slug, &self.default_name())
            .await
    }
}
