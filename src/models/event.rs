// src/models/event.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::rbac::Role;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "event_visibility", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventVisibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "event_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Approved,
    Pending,
    Rejected,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub room_id: Uuid,
    pub creator_id: Uuid,
    #[schema(example = "Hackathon 2025")]
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub visibility: EventVisibility,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
}

// Linha "achatada" da consulta do calendário (JOIN com sala/prédio/criador)
#[derive(Debug, Clone, FromRow)]
pub struct CalendarRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub room_name: String,
    pub building_name: String,
    pub creator_name: String,
    pub creator_role: Role,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRoom {
    pub name: String,
    pub building: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCreator {
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub room: CalendarRoom,
    pub creator: CalendarCreator,
}

impl From<CalendarRow> for CalendarEvent {
    fn from(row: CalendarRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            start_time: row.start_time,
            end_time: row.end_time,
            room: CalendarRoom { name: row.room_name, building: row.building_name },
            creator: CalendarCreator { name: row.creator_name, role: row.creator_role },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarResponse {
    pub events: Vec<CalendarEvent>,
}

/// Janela opcional + limite do calendário público.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

fn validate_event_window(payload: &CreateEventPayload) -> Result<(), ValidationError> {
    if payload.end_time <= payload.start_time {
        let mut err = ValidationError::new("time_order");
        err.message = Some("O término deve ser depois do início.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_event_window", skip_on_field_errors = false))]
pub struct CreateEventPayload {
    #[validate(length(min = 1, max = 200, message = "O título é obrigatório."))]
    pub title: String,
    pub description: Option<String>,
    pub room_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default = "default_visibility")]
    pub visibility: EventVisibility,
}

fn default_visibility() -> EventVisibility {
    EventVisibility::Private
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEventPayload {
    pub status: EventStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn payload(start: DateTime<Utc>, end: DateTime<Utc>) -> CreateEventPayload {
        CreateEventPayload {
            title: "Seminário".into(),
            description: None,
            room_id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            visibility: EventVisibility::Public,
        }
    }

    #[test]
    fn end_before_start_is_a_validation_error() {
        let now = Utc::now();
        assert!(payload(now, now + Duration::hours(1)).validate().is_ok());
        assert!(payload(now, now).validate().is_err());
        assert!(payload(now, now - Duration::minutes(5)).validate().is_err());
    }

    #[test]
    fn visibility_defaults_to_private() {
        let raw = serde_json::json!({
            "title": "Reunião",
            "roomId": Uuid::nil(),
            "startTime": "2025-03-01T10:00:00Z",
            "endTime": "2025-03-01T11:00:00Z"
        });
        let parsed: CreateEventPayload = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.visibility, EventVisibility::Private);
    }

    #[test]
    fn calendar_row_is_nested_for_the_client() {
        let row = CalendarRow {
            id: Uuid::nil(),
            title: "Feira".into(),
            description: None,
            start_time: Utc::now(),
            end_time: Utc::now(),
            room_name: "Room 101".into(),
            building_name: "Main".into(),
            creator_name: "Ana".into(),
            creator_role: Role::ClubMember,
        };
        let json = serde_json::to_value(CalendarEvent::from(row)).unwrap();
        assert_eq!(json["room"]["building"], "Main");
        assert_eq!(json["creator"]["role"], "CLUB_MEMBER");
        assert!(json.get("status").is_none());
        assert!(json.get("visibility").is_none());
    }
}
