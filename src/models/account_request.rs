// src/models/account_request.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::rbac::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "account_user_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountUserType {
    Student,
    Faculty,
    Staff,
    Researcher,
    Guest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "account_request_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRequestStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl AccountRequestStatus {
    /// Só pedidos ainda "em aberto" podem ser revisados.
    pub fn is_open(self) -> bool {
        matches!(self, AccountRequestStatus::Pending | AccountRequestStatus::UnderReview)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub user_type: AccountUserType,
    pub student_id: Option<String>,
    pub employee_id: Option<String>,
    pub year: Option<String>,
    pub semester: Option<String>,
    pub department: String,
    pub course: Option<String>,
    pub designation: Option<String>,
    pub reason_for_access: String,
    pub intended_use: String,
    pub requested_role: Role,
    pub status: AccountRequestStatus,
    pub review_comment: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
}

impl AccountRequest {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// Cargos que podem ser pedidos por conta própria (ou dados numa aprovação)
pub(crate) fn validate_requestable_role(role: &Role) -> Result<(), ValidationError> {
    match role {
        Role::ClubMember | Role::DeptCoord | Role::ResourceManager => Ok(()),
        _ => {
            let mut err = ValidationError::new("requestable_role");
            err.message = Some("Este cargo não pode ser solicitado.".into());
            Err(err)
        }
    }
}

fn default_requested_role() -> Role {
    Role::ClubMember
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequestPayload {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(min = 10, message = "Valid phone number is required"))]
    pub phone_number: String,

    pub user_type: AccountUserType,
    pub student_id: Option<String>,
    pub employee_id: Option<String>,
    pub year: Option<String>,
    pub semester: Option<String>,
    #[validate(length(min = 1, message = "Department is required"))]
    pub department: String,
    pub course: Option<String>,
    pub designation: Option<String>,

    #[validate(length(min = 10, message = "Please provide a detailed reason for access"))]
    pub reason_for_access: String,
    #[validate(length(min = 10, message = "Please describe how you intend to use the system"))]
    pub intended_use: String,
    #[serde(default = "default_requested_role")]
    #[validate(custom(function = "validate_requestable_role"))]
    pub requested_role: Role,
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).is_none_or(str::is_empty)
}

impl AccountRequestPayload {
    /// Regras que dependem do tipo de usuário (aluno precisa de matrícula etc).
    pub fn validate_identifiers(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.user_type == AccountUserType::Student && blank(&self.student_id) {
            let mut err = ValidationError::new("required");
            err.message = Some("Student ID is required for students".into());
            errors.add("studentId", err);
        }

        if matches!(self.user_type, AccountUserType::Faculty | AccountUserType::Staff)
            && blank(&self.employee_id)
        {
            let mut err = ValidationError::new("required");
            err.message = Some("Employee ID is required for faculty and staff".into());
            errors.add("employeeId", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

// Auto-cadastro simples (/api/request-account): já cria o usuário PENDING
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestAccountPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "a@x.edu")]
    pub email: String,
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,
    pub phone: Option<String>,
    #[validate(length(min = 10, message = "Descreva o motivo com pelo menos 10 caracteres."))]
    pub purpose: String,
    pub club_name: Option<String>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestAccountResponse {
    pub message: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
    Clarify,
}

impl ReviewAction {
    pub fn resulting_status(self) -> AccountRequestStatus {
        match self {
            ReviewAction::Approve => AccountRequestStatus::Approved,
            ReviewAction::Reject => AccountRequestStatus::Rejected,
            ReviewAction::Clarify => AccountRequestStatus::UnderReview,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewAccountRequestPayload {
    pub action: ReviewAction,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccountRequestFilter {
    pub status: Option<AccountRequestStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequestReceipt {
    pub success: bool,
    pub message: String,
    pub request_id: Uuid,
}
