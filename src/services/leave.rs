use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use uuid::Uuid;

use crate::database::models::{CreateLeaveRequestInput, LeaveRequest, LeaveStatus};
use crate::database::repositories::{LeaveRequestRepository, UserRepository};
use crate::error::AppError;
use crate::services::clock::Clock;

pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Leave-request workflow: pending -> approved | rejected, processed only
/// by the requester's direct manager. Terminal states are immutable.
#[derive(Clone)]
pub struct LeaveService {
    leaves: LeaveRequestRepository,
    users: UserRepository,
    clock: Arc<dyn Clock>,
    reporting_offset: FixedOffset,
}

impl LeaveService {
    pub fn new(
        leaves: LeaveRequestRepository,
        users: UserRepository,
        clock: Arc<dyn Clock>,
        reporting_offset: FixedOffset,
    ) -> Self {
        Self {
            leaves,
            users,
            clock,
            reporting_offset,
        }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        input: CreateLeaveRequestInput,
    ) -> Result<LeaveRequest, AppError> {
        let today = self
            .clock
            .now()
            .with_timezone(&self.reporting_offset)
            .date_naive();

        validate_leave_input(&input, today)?;

        let request = self
            .leaves
            .create_request(
                user_id,
                input.leave_type,
                input.start_date,
                input.end_date,
                input.reason.trim(),
            )
            .await?;

        Ok(request)
    }

    pub async fn list_own(&self, user_id: Uuid) -> Result<Vec<LeaveRequest>, AppError> {
        Ok(self.leaves.list_for_user(user_id).await?)
    }

    pub async fn list_pending_for_manager(
        &self,
        manager_id: Uuid,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        Ok(self.leaves.list_pending_for_manager(manager_id).await?)
    }

    pub async fn approve(
        &self,
        manager_id: Uuid,
        request_id: Uuid,
    ) -> Result<LeaveRequest, AppError> {
        self.process(manager_id, request_id, LeaveStatus::Approved, None)
            .await
    }

    pub async fn reject(
        &self,
        manager_id: Uuid,
        request_id: Uuid,
        manager_comment: &str,
    ) -> Result<LeaveRequest, AppError> {
        let comment = manager_comment.trim();
        if comment.is_empty() {
            return Err(AppError::Unprocessable(
                "A manager comment is required when rejecting a leave request.".to_string(),
            ));
        }
        if comment.chars().count() > MAX_COMMENT_LENGTH {
            return Err(AppError::Unprocessable(format!(
                "Manager comment must be at most {} characters.",
                MAX_COMMENT_LENGTH
            )));
        }

        self.process(
            manager_id,
            request_id,
            LeaveStatus::Rejected,
            Some(comment.to_string()),
        )
        .await
    }

    async fn process(
        &self,
        manager_id: Uuid,
        request_id: Uuid,
        status: LeaveStatus,
        manager_comment: Option<String>,
    ) -> Result<LeaveRequest, AppError> {
        let request = self
            .leaves
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;

        let requester = self
            .users
            .find_by_id(request.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Requesting user not found".to_string()))?;

        ensure_direct_manager(manager_id, requester.manager_id)?;
        ensure_pending(&request)?;

        // The repository transitions only pending rows; a concurrent
        // processor that got there first turns this into the same conflict.
        self.leaves
            .process_request(request_id, status, manager_id, manager_comment)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Leave request has already been processed.".to_string())
            })
    }
}

pub fn validate_leave_input(
    input: &CreateLeaveRequestInput,
    today: NaiveDate,
) -> Result<(), AppError> {
    if input.start_date < today {
        return Err(AppError::Unprocessable(
            "Leave cannot start in the past.".to_string(),
        ));
    }
    if input.end_date < input.start_date {
        return Err(AppError::Unprocessable(
            "End date must not be before the start date.".to_string(),
        ));
    }

    let reason = input.reason.trim();
    if reason.is_empty() {
        return Err(AppError::Unprocessable(
            "A reason is required.".to_string(),
        ));
    }
    if reason.chars().count() > MAX_COMMENT_LENGTH {
        return Err(AppError::Unprocessable(format!(
            "Reason must be at most {} characters.",
            MAX_COMMENT_LENGTH
        )));
    }

    Ok(())
}

pub fn ensure_direct_manager(
    manager_id: Uuid,
    requester_manager_id: Option<Uuid>,
) -> Result<(), AppError> {
    if requester_manager_id != Some(manager_id) {
        return Err(AppError::Forbidden(
            "Only the requester's direct manager can process this leave request.".to_string(),
        ));
    }
    Ok(())
}

pub fn ensure_pending(request: &LeaveRequest) -> Result<(), AppError> {
    if request.status.is_terminal() {
        return Err(AppError::Conflict(format!(
            "Leave request has already been {}.",
            request.status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::LeaveType;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn input(start: NaiveDate, end: NaiveDate, reason: &str) -> CreateLeaveRequestInput {
        CreateLeaveRequestInput {
            leave_type: LeaveType::Vacation,
            start_date: start,
            end_date: end,
            reason: reason.to_string(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pending_request() -> LeaveRequest {
        let now = Utc::now();
        LeaveRequest {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            leave_type: LeaveType::Sick,
            start_date: day(2025, 7, 1),
            end_date: day(2025, 7, 3),
            reason: "flu".to_string(),
            status: LeaveStatus::Pending,
            processed_by: None,
            manager_comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn accepts_a_single_day_request_starting_today() {
        let today = day(2025, 6, 18);
        assert!(validate_leave_input(&input(today, today, "dentist"), today).is_ok());
    }

    #[test]
    fn rejects_a_start_date_in_the_past() {
        let today = day(2025, 6, 18);
        let err =
            validate_leave_input(&input(day(2025, 6, 17), day(2025, 6, 20), "late"), today)
                .unwrap_err();
        assert!(matches!(err, AppError::Unprocessable(_)));
    }

    #[test]
    fn rejects_an_end_before_the_start() {
        let today = day(2025, 6, 18);
        let err =
            validate_leave_input(&input(day(2025, 6, 20), day(2025, 6, 19), "trip"), today)
                .unwrap_err();
        assert!(matches!(err, AppError::Unprocessable(_)));
    }

    #[test]
    fn rejects_a_blank_reason() {
        let today = day(2025, 6, 18);
        let err = validate_leave_input(&input(today, today, "   "), today).unwrap_err();
        assert!(matches!(err, AppError::Unprocessable(_)));
    }

    #[test]
    fn rejects_an_overlong_reason() {
        let today = day(2025, 6, 18);
        let reason = "x".repeat(MAX_COMMENT_LENGTH + 1);
        let err = validate_leave_input(&input(today, today, &reason), today).unwrap_err();
        assert!(matches!(err, AppError::Unprocessable(_)));
    }

    #[test]
    fn only_the_direct_manager_may_process() {
        let manager = Uuid::new_v4();
        let someone_else = Uuid::new_v4();

        assert!(ensure_direct_manager(manager, Some(manager)).is_ok());
        assert!(matches!(
            ensure_direct_manager(someone_else, Some(manager)).unwrap_err(),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            ensure_direct_manager(manager, None).unwrap_err(),
            AppError::Forbidden(_)
        ));
    }

    #[test]
    fn terminal_states_cannot_be_reprocessed() {
        let mut request = pending_request();
        assert!(ensure_pending(&request).is_ok());

        request.status = LeaveStatus::Approved;
        let err = ensure_pending(&request).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "Leave request has already been approved.");

        request.status = LeaveStatus::Rejected;
        assert!(matches!(
            ensure_pending(&request).unwrap_err(),
            AppError::Conflict(_)
        ));
    }
}
