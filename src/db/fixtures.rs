// src/db/fixtures.rs

// Dados mínimos para os testes que rodam contra o Postgres (#[sqlx::test]).

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::{AppConfig, AppState},
    db::{CampusRepository, NewUser, TenantRepository, UserRepository},
    models::{
        auth::{User, UserState},
        campus::{Room, RoomInput, RoomType},
        event::{EventStatus, EventVisibility},
        rbac::Role,
        tenancy::Tenant,
    },
};

pub fn app_state(pool: PgPool) -> AppState {
    AppState::with_pool(AppConfig::for_tests(), pool).unwrap()
}

pub async fn tenant(pool: &PgPool, slug: &str, name: &str) -> Result<Tenant, AppError> {
    let mut conn = pool.acquire().await?;
    TenantRepository::new(pool.clone())
        .get_or_create(&mut conn, slug, name)
        .await
}

pub async fn user(
    pool: &PgPool,
    tenant_id: Uuid,
    email: &str,
    role: Role,
    state: UserState,
) -> Result<User, AppError> {
    UserRepository::new(pool.clone())
        .create_user(
            pool,
            NewUser {
                tenant_id,
                email,
                name: email,
                image: None,
                phone: None,
                google_id: None,
                password_hash: None,
                role,
                state,
            },
        )
        .await
}

/// Um prédio com uma sala de aula.
pub async fn room(pool: &PgPool, tenant_id: Uuid, name: &str) -> Result<Room, AppError> {
    let campus = CampusRepository::new(pool.clone());
    let building = campus.create_building(pool, tenant_id, "Main Building", 3).await?;
    campus
        .create_room(
            pool,
            building.id,
            &RoomInput { name: name.to_string(), capacity: 40, room_type: RoomType::Classroom },
        )
        .await
}

/// Grava um evento direto, já com status e visibilidade, `day` dias à frente.
pub async fn event(
    pool: &PgPool,
    room: &Room,
    creator: &User,
    title: &str,
    visibility: EventVisibility,
    status: EventStatus,
    day: i32,
) -> Result<Uuid, AppError> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO events (tenant_id, room_id, creator_id, title, start_time, end_time, visibility, status)
        VALUES (
            $1, $2, $3, $4,
            NOW() + make_interval(days => $7),
            NOW() + make_interval(days => $7, hours => 1),
            $5, $6
        )
        RETURNING id
        "#,
    )
    .bind(creator.tenant_id)
    .bind(room.id)
    .bind(creator.id)
    .bind(title)
    .bind(visibility)
    .bind(status)
    .bind(day)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
