// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{User, UserState},
        rbac::Role,
    },
};

/// Dados de um usuário ainda não gravado.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub tenant_id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub image: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub google_id: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub role: Role,
    pub state: UserState,
}

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_by_email_with(&self.pool, email).await
    }

    pub async fn find_by_email_with<'e, E>(
        &self,
        executor: E,
        email: &str,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Mesma busca, mas trava a linha até o fim da transação.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn any_user_exists<'e, E>(&self, executor: E) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users)")
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    // Cria um novo usuário.
    // E-mail duplicado vira EmailAlreadyExists (inclusive numa corrida entre dois cadastros).
    pub async fn create_user<'e, E>(&self, executor: E, new_user: NewUser<'_>) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                tenant_id, email, name, image, phone,
                google_id, password_hash, role, state
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(new_user.tenant_id)
        .bind(new_user.email)
        .bind(new_user.name)
        .bind(new_user.image)
        .bind(new_user.phone)
        .bind(new_user.google_id)
        .bind(new_user.password_hash)
        .bind(new_user.role)
        .bind(new_user.state)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    /// Preenche o google_id só se ainda estiver vazio.
    pub async fn set_google_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        google_id: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET google_id = COALESCE(google_id, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(google_id)
        .fetch_one(executor)
        .await?;
        Ok(user)
    }

    /// Atualiza cargo e/ou estado. `None` mantém o valor atual.
    pub async fn update_role_state<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        role: Option<Role>,
        state: Option<UserState>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = COALESCE($2, role),
                state = COALESCE($3, state),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(role)
        .bind(state)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::UserNotFound)
    }

    pub async fn delete_user<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    /// Usuários PENDING da faculdade, mais novos primeiro.
    pub async fn list_pending(&self, tenant_id: Uuid) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE tenant_id = $1 AND state = 'PENDING'
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Usuários ACTIVE com um dos cargos pedidos (destinatários de avisos).
    pub async fn list_active_with_roles(
        &self,
        tenant_id: Uuid,
        roles: &[Role],
    ) -> Result<Vec<User>, AppError> {
        let roles: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE tenant_id = $1
              AND state = 'ACTIVE'
              AND role::text = ANY($2)
            ORDER BY created_at
            "#,
        )
        .bind(tenant_id)
        .bind(roles)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
