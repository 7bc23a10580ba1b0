pub mod user_repo;
pub use user_repo::{NewUser, UserRepository};
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod campus_repo;
pub use campus_repo::CampusRepository;
pub mod event_repo;
pub use event_repo::EventRepository;
pub mod account_request_repo;
pub use account_request_repo::AccountRequestRepository;

#[cfg(test)]
pub mod fixtures;
