pub mod admin;
pub mod auth;
pub mod companies;
pub mod leave_requests;
pub mod manager;
pub mod schedules;
pub mod shared;
pub mod time_entries;

pub use shared::ApiResponse;
