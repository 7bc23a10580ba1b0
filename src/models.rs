pub mod account_request;
pub mod auth;
pub mod campus;
pub mod event;
pub mod rbac;
pub mod tenancy;
