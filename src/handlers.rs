pub mod accounts;
pub mod admin;
pub mod auth;
pub mod calendar;
pub mod events;
pub mod onboarding;
