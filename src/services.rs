pub mod account_service;
pub mod auth;
pub mod calendar_service;
pub mod event_service;
pub mod identity_service;
pub mod notification_service;
pub mod oauth;
pub mod onboarding_service;
pub mod tenancy_service;
pub mod user_admin_service;
