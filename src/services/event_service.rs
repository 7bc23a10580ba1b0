// src/services/event_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CampusRepository, EventRepository},
    models::{
        auth::SessionUser,
        event::{CreateEventPayload, Event, EventStatus},
    },
};

#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    campus_repo: CampusRepository,
    pool: PgPool,
}

impl EventService {
    pub fn new(event_repo: EventRepository, campus_repo: CampusRepository, pool: PgPool) -> Self {
        Self { event_repo, campus_repo, pool }
    }

    /// Cria a reserva como PENDING.
    /// A checagem de sobreposição roda na mesma transação do INSERT, mas
    /// duas reservas simultâneas ainda podem passar (só o horário idêntico de reservas não rejeitadas é barrado pelo banco).
    pub async fn create_event(
        &self,
        actor: &SessionUser,
        payload: &CreateEventPayload,
    ) -> Result<Event, AppError> {
        self.campus_repo
            .find_room_in_tenant(payload.room_id, actor.tenant_id)
            .await?
            .ok_or(AppError::NotFound("room.not_found"))?;

        let mut tx = self.pool.begin().await?;

        let overlaps = self
            .event_repo
            .has_overlap(&mut *tx, payload.room_id, payload.start_time, payload.end_time)
            .await?;

        if overlaps {
            return Err(AppError::Conflict("event.conflict"));
        }

        let event = self
            .event_repo
            .create_event(&mut *tx, actor.tenant_id, actor.id, payload)
            .await?;

        tx.commit().await?;

        tracing::info!("📅 Reserva '{}' criada por {} (sala {})", event.title, actor.id, event.room_id);
        Ok(event)
    }

    pub async fn review_event(
        &self,
        actor: &SessionUser,
        event_id: Uuid,
        status: EventStatus,
    ) -> Result<Event, AppError> {
        if status == EventStatus::Pending {
            return Err(AppError::BadRequest("event.invalid_status"));
        }

        let event = self
            .event_repo
            .update_status(event_id, actor.tenant_id, status)
            .await?
            .ok_or(AppError::NotFound("event.not_found"))?;

        tracing::info!("📅 Reserva {} marcada como {:?} por {}", event.id, event.status, actor.id);
        Ok(event)
    }
}
