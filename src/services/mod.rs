pub mod access;
pub mod audit_logger;
pub mod auth;
pub mod clock;
pub mod leave;
pub mod presence;
pub mod time_entry;

pub use audit_logger::AuditLogger;
pub use auth::{AuthService, Claims};
pub use clock::{Clock, FixedClock, SystemClock};
pub use leave::LeaveService;
pub use time_entry::TimeEntryService;
