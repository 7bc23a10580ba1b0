// src/db/event_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::event::{CalendarRow, CreateEventPayload, Event, EventStatus},
};

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Eventos APPROVED + PUBLIC da faculdade, por horário de início.
    /// `from`/`to` são opcionais; `limit` já chega limitado pelo serviço.
    pub async fn list_public_calendar(
        &self,
        tenant_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<CalendarRow>, AppError> {
        let rows = sqlx::query_as::<_, CalendarRow>(
            r#"
            SELECT
                e.id, e.title, e.description, e.start_time, e.end_time,
                r.name AS room_name,
                b.name AS building_name,
                u.name AS creator_name,
                u.role AS creator_role
            FROM events e
            JOIN rooms r ON r.id = e.room_id
            JOIN buildings b ON b.id = r.building_id
            JOIN users u ON u.id = e.creator_id
            WHERE e.tenant_id = $1
              AND e.status = 'APPROVED'
              AND e.visibility = 'PUBLIC'
              AND ($2::timestamptz IS NULL OR e.end_time >= $2)
              AND ($3::timestamptz IS NULL OR e.start_time <= $3)
            ORDER BY e.start_time ASC
            LIMIT $4
            "#,
        )
        .bind(tenant_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Algum evento não rejeitado da sala cruza a janela [start, end)?
    pub async fn has_overlap<'e, E>(
        &self,
        executor: E,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let overlaps: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM events
                WHERE room_id = $1
                  AND status <> 'REJECTED'
                  AND start_time < $3
                  AND $2 < end_time
            )
            "#,
        )
        .bind(room_id)
        .bind(start)
        .bind(end)
        .fetch_one(executor)
        .await?;
        Ok(overlaps)
    }

    pub async fn create_event<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        creator_id: Uuid,
        payload: &CreateEventPayload,
    ) -> Result<Event, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                tenant_id, room_id, creator_id, title, description,
                start_time, end_time, visibility, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'PENDING')
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.room_id)
        .bind(creator_id)
        .bind(&payload.title)
        .bind(payload.description.as_deref())
        .bind(payload.start_time)
        .bind(payload.end_time)
        .bind(payload.visibility)
        .fetch_one(executor)
        .await
        .map_err(slot_conflict)
    }

    pub async fn update_status(
        &self,
        event_id: Uuid,
        tenant_id: Uuid,
        status: EventStatus,
    ) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events SET status = $3
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(tenant_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(slot_conflict)?;
        Ok(event)
    }
}

// Índice único parcial (ignora REJECTED): o Postgres reporta o nome do índice.
// Também pega o caso de reaprovar uma reserva rejeitada cujo horário já foi tomado.
fn slot_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some("events_room_slot_unique") {
            return AppError::Conflict("event.conflict");
        }
    }
    e.into()
}
