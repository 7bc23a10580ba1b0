pub mod auth;
pub mod i18n;
pub mod json;
pub mod rbac;
pub mod tenancy;
