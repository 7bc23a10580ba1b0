// src/db/account_request_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::account_request::{AccountRequest, AccountRequestPayload, AccountRequestStatus},
};

#[derive(Clone)]
pub struct AccountRequestRepository {
    pool: PgPool,
}

impl AccountRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        payload: &AccountRequestPayload,
    ) -> Result<AccountRequest, AppError> {
        let request = sqlx::query_as::<_, AccountRequest>(
            r#"
            INSERT INTO account_requests (
                tenant_id, first_name, last_name, email, phone_number,
                user_type, student_id, employee_id, year, semester,
                department, course, designation,
                reason_for_access, intended_use, requested_role
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.first_name.trim())
        .bind(payload.last_name.trim())
        .bind(payload.email.trim().to_lowercase())
        .bind(payload.phone_number.trim())
        .bind(payload.user_type)
        .bind(payload.student_id.as_deref())
        .bind(payload.employee_id.as_deref())
        .bind(payload.year.as_deref())
        .bind(payload.semester.as_deref())
        .bind(payload.department.trim())
        .bind(payload.course.as_deref())
        .bind(payload.designation.as_deref())
        .bind(&payload.reason_for_access)
        .bind(&payload.intended_use)
        .bind(payload.requested_role)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<AccountRequestStatus>,
    ) -> Result<Vec<AccountRequest>, AppError> {
        let requests = sqlx::query_as::<_, AccountRequest>(
            r#"
            SELECT * FROM account_requests
            WHERE tenant_id = $1
              AND ($2::account_request_status IS NULL OR status = $2)
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<AccountRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, AccountRequest>(
            "SELECT * FROM account_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(request)
    }

    pub async fn record_review<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: AccountRequestStatus,
        comment: Option<&str>,
        reviewer_id: Uuid,
    ) -> Result<AccountRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, AccountRequest>(
            r#"
            UPDATE account_requests
            SET status = $2, review_comment = $3, reviewed_by = $4, reviewed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(comment)
        .bind(reviewer_id)
        .fetch_one(executor)
        .await?;
        Ok(request)
    }
}
