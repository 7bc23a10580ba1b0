// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::google_authorize,
        handlers::auth::google_callback,
        handlers::auth::login,
        handlers::auth::refresh,

        // --- Users ---
        handlers::auth::get_me,

        // --- Accounts ---
        handlers::accounts::request_account,
        handlers::accounts::submit_account_request,

        // --- Admin ---
        handlers::admin::list_pending_users,
        handlers::admin::update_user,
        handlers::admin::approve_user,
        handlers::admin::list_account_requests,
        handlers::admin::review_account_request,

        // --- Onboarding ---
        handlers::onboarding::complete_onboarding,

        // --- Calendar ---
        handlers::calendar::public_calendar,
        handlers::calendar::tenant_calendar,

        // --- Events ---
        handlers::events::create_event,
        handlers::events::review_event,
    ),
    components(
        schemas(
            // --- Auth ---
            models::rbac::Role,
            models::auth::UserState,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,
            models::auth::GoogleAuthorizeResponse,
            models::auth::GoogleCallbackPayload,

            // --- Admin ---
            models::auth::UpdateUserPayload,
            models::auth::ApproveUserPayload,
            models::auth::ApprovalResponse,
            models::auth::PendingUsersResponse,

            // --- Accounts ---
            models::account_request::AccountUserType,
            models::account_request::AccountRequestStatus,
            models::account_request::AccountRequest,
            models::account_request::AccountRequestPayload,
            models::account_request::AccountRequestReceipt,
            models::account_request::RequestAccountPayload,
            models::account_request::RequestAccountResponse,
            models::account_request::ReviewAction,
            models::account_request::ReviewAccountRequestPayload,

            // --- Onboarding ---
            models::tenancy::Tenant,
            models::campus::RoomType,
            models::campus::CollegeProfile,
            models::campus::RoomInput,
            models::campus::BuildingInput,
            models::campus::DepartmentInput,
            models::campus::ResourceInput,
            models::campus::OnboardingPayload,
            models::campus::OnboardingSummary,
            models::campus::OnboardingResponse,

            // --- Calendar / Events ---
            models::event::EventVisibility,
            models::event::EventStatus,
            models::event::Event,
            models::event::CalendarRoom,
            models::event::CalendarCreator,
            models::event::CalendarEvent,
            models::event::CalendarResponse,
            models::event::CreateEventPayload,
            models::event::ReviewEventPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login com Google, senha e renovação de sessão"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Accounts", description = "Pedidos de Conta"),
        (name = "Admin", description = "Aprovação e Gestão de Usuários da Faculdade"),
        (name = "Onboarding", description = "Configuração Inicial da Faculdade"),
        (name = "Calendar", description = "Calendário Público"),
        (name = "Events", description = "Reservas de Salas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/google",
            "/api/auth/google/callback",
            "/api/users/me",
            "/api/admin/pending-users",
            "/api/admin/users/{id}/approve",
            "/api/admin/onboarding",
            "/api/public/{tenant_slug}/calendar",
            "/api/events",
        ] {
            assert!(doc.paths.paths.contains_key(path), "faltando {}", path);
        }
    }
}
