// src/models/campus.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "room_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Classroom,
    Lab,
    Auditorium,
    Conference,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[schema(example = "Computer Science")]
    pub name: String,
    #[schema(example = "CS")]
    pub code: Option<String>,
    pub hod_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub floors: i32,
    pub created_at: DateTime<Utc>,
}

// O tenant da sala vem pelo prédio
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub building_id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub room_type: RoomType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[schema(example = "Projetor Epson")]
    pub name: String,
    pub quantity: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---
// Payload do wizard de onboarding
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollegeProfile {
    #[validate(length(min = 1, message = "O nome da faculdade é obrigatório."))]
    #[schema(example = "Jai Hind College")]
    pub name: String,
    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,
    #[validate(length(min = 1, message = "A cidade é obrigatória."))]
    pub city: String,
    #[validate(email(message = "O e-mail de contato é inválido."))]
    pub contact_email: String,
    #[validate(length(min = 1, message = "O telefone de contato é obrigatório."))]
    pub contact_phone: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomInput {
    #[validate(length(min = 1, message = "O nome da sala é obrigatório."))]
    pub name: String,
    #[validate(range(min = 1, message = "A capacidade deve ser positiva."))]
    pub capacity: i32,
    #[serde(rename = "type")]
    pub room_type: RoomType,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingInput {
    #[validate(length(min = 1, message = "O nome do prédio é obrigatório."))]
    pub name: String,
    #[validate(range(min = 1, message = "O prédio precisa de ao menos um andar."))]
    pub floors: i32,
    #[validate(nested)]
    #[serde(default)]
    pub rooms: Vec<RoomInput>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentInput {
    #[validate(length(min = 1, message = "O nome do departamento é obrigatório."))]
    pub name: String,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInput {
    #[validate(length(min = 1, message = "O nome do recurso é obrigatório."))]
    pub name: String,
    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingPayload {
    #[validate(nested)]
    pub college: CollegeProfile,
    #[validate(nested)]
    #[serde(default)]
    pub buildings: Vec<BuildingInput>,
    #[validate(nested)]
    #[serde(default)]
    pub departments: Vec<DepartmentInput>,
    #[validate(nested)]
    #[serde(default)]
    pub resources: Vec<ResourceInput>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSummary {
    pub buildings: usize,
    pub rooms: usize,
    pub departments: usize,
    pub resources: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingResponse {
    pub message: String,
    /// Token novo, já com state=ACTIVE.
    pub token: String,
    pub summary: OnboardingSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> serde_json::Value {
        json!({
            "college": {
                "name": "Jai Hind College",
                "address": "A Road, Churchgate",
                "city": "Mumbai",
                "contactEmail": "info@jaihind.edu",
                "contactPhone": "+91-22-2266-1234"
            },
            "buildings": [{
                "name": "Main Building",
                "floors": 5,
                "rooms": [{ "name": "Room 101", "capacity": 60, "type": "CLASSROOM" }]
            }],
            "departments": [{ "name": "Computer Science", "code": "CS" }],
            "resources": [{ "name": "Projector", "quantity": 4 }]
        })
    }

    #[test]
    fn accepts_a_complete_onboarding_payload() {
        let payload: OnboardingPayload = serde_json::from_value(valid_payload()).unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.buildings[0].rooms[0].room_type, RoomType::Classroom);
    }

    #[test]
    fn nested_room_errors_are_reported() {
        let mut raw = valid_payload();
        raw["buildings"][0]["rooms"][0]["capacity"] = json!(0);
        let payload: OnboardingPayload = serde_json::from_value(raw).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.errors().contains_key("buildings"));
    }

    #[test]
    fn bad_contact_email_is_rejected() {
        let mut raw = valid_payload();
        raw["college"]["contactEmail"] = json!("not-an-email");
        let payload: OnboardingPayload = serde_json::from_value(raw).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn unknown_room_type_fails_to_deserialize() {
        let mut raw = valid_payload();
        raw["buildings"][0]["rooms"][0]["type"] = json!("GYM");
        assert!(serde_json::from_value::<OnboardingPayload>(raw).is_err());
    }
}
