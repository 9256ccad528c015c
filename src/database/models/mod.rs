pub mod audit;
pub mod company;
pub mod leave_request;
pub(crate) mod macros;
pub mod schedule;
pub mod time_entry;
pub mod user;

pub use audit::{AuditLog, CreateAuditLogInput, SubjectType};
pub use company::{Company, CreateCompanyInput};
pub use leave_request::{
    CreateLeaveRequestInput, LeaveRequest, LeaveStatus, LeaveType, RejectLeaveRequestInput,
};
pub use schedule::{
    AssignScheduleInput, CreateWorkScheduleInput, DailySchedule, DailyScheduleInput, WorkSchedule,
    WorkScheduleWithDays,
};
pub use time_entry::{
    CompanyStatistics, EntryType, PeriodStats, StartTimeEntryInput, StopTimeEntryInput, TimeEntry,
    TimeSummary,
};
pub use user::{
    AuthResponse, CreateUserInput, LoginInput, UpdateRoleInput, UpdateUserInput, User, UserInfo,
    UserRole, WorkMode,
};
