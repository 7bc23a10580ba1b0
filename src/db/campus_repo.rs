// src/db/campus_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::campus::{Building, Department, Resource, ResourceInput, Room, RoomInput},
};

// Prédios, salas, departamentos e recursos de uma faculdade
#[derive(Clone)]
pub struct CampusRepository {
    pool: PgPool,
}

impl CampusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_building<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        floors: i32,
    ) -> Result<Building, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let building = sqlx::query_as::<_, Building>(
            r#"
            INSERT INTO buildings (tenant_id, name, floors)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(floors)
        .fetch_one(executor)
        .await?;
        Ok(building)
    }

    pub async fn create_room<'e, E>(
        &self,
        executor: E,
        building_id: Uuid,
        room: &RoomInput,
    ) -> Result<Room, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let room = sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (building_id, name, capacity, room_type)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(building_id)
        .bind(&room.name)
        .bind(room.capacity)
        .bind(room.room_type)
        .fetch_one(executor)
        .await?;
        Ok(room)
    }

    /// Departamento é único por (tenant, nome): repetir só atualiza o código.
    pub async fn upsert_department<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        code: Option<&str>,
    ) -> Result<Department, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let department = sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (tenant_id, name, code)
            VALUES ($1, $2, $3)
            ON CONFLICT (tenant_id, name)
            DO UPDATE SET code = COALESCE(EXCLUDED.code, departments.code)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(code)
        .fetch_one(executor)
        .await?;
        Ok(department)
    }

    pub async fn create_resource<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        resource: &ResourceInput,
    ) -> Result<Resource, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let resource = sqlx::query_as::<_, Resource>(
            r#"
            INSERT INTO resources (tenant_id, name, quantity, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&resource.name)
        .bind(resource.quantity)
        .bind(resource.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(resource)
    }

    /// A sala só "existe" para quem é da mesma faculdade do prédio.
    pub async fn find_room_in_tenant(
        &self,
        room_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Room>, AppError> {
        let room = sqlx::query_as::<_, Room>(
            r#"
            SELECT r.*
            FROM rooms r
            JOIN buildings b ON b.id = r.building_id
            WHERE r.id = $1 AND b.tenant_id = $2
            "#,
        )
        .bind(room_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(room)
    }
}
