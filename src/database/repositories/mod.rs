pub mod audit;
pub mod company;
pub mod leave_request;
pub mod schedule;
pub mod time_entry;
pub mod user;

// Re-export all repositories for easy importing
pub use audit::AuditRepository;
pub use company::CompanyRepository;
pub use leave_request::LeaveRequestRepository;
pub use schedule::ScheduleRepository;
pub use time_entry::TimeEntryRepository;
pub use user::UserRepository;
