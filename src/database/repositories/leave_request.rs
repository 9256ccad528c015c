use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{LeaveRequest, LeaveStatus, LeaveType};

const LEAVE_COLUMNS: &str = r#"
    id,
    user_id,
    leave_type,
    start_date,
    end_date,
    reason,
    status,
    processed_by,
    manager_comment,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct LeaveRequestRepository {
    pool: PgPool,
}

impl LeaveRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_request(
        &self,
        user_id: Uuid,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: &str,
    ) -> Result<LeaveRequest, sqlx::Error> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            INSERT INTO
                leave_requests (id, user_id, leave_type, start_date, end_date, reason,
                                status, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {LEAVE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(leave_type)
        .bind(start_date)
        .bind(end_date)
        .bind(reason)
        .bind(LeaveStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveRequest>, sqlx::Error> {
        let request = sqlx::query_as::<_, LeaveRequest>(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LeaveRequest>, sqlx::Error> {
        let requests = sqlx::query_as::<_, LeaveRequest>(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Pending requests from the manager's direct reports, oldest first so
    /// the queue is processed in arrival order.
    pub async fn list_pending_for_manager(
        &self,
        manager_id: Uuid,
    ) -> Result<Vec<LeaveRequest>, sqlx::Error> {
        let requests = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            SELECT {}
            FROM leave_requests r
            JOIN users u ON u.id = r.user_id
            WHERE u.manager_id = $1 AND r.status = $2
            ORDER BY r.created_at
            "#,
            leave_columns_qualified()
        ))
        .bind(manager_id)
        .bind(LeaveStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Transition a pending request to a terminal state. The WHERE clause
    /// keeps the read-then-update inside one statement: a request that is
    /// no longer pending is left untouched and None is returned.
    pub async fn process_request(
        &self,
        id: Uuid,
        status: LeaveStatus,
        processed_by: Uuid,
        manager_comment: Option<String>,
    ) -> Result<Option<LeaveRequest>, sqlx::Error> {
        let request = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            UPDATE leave_requests
            SET
                status = $2,
                processed_by = $3,
                manager_comment = $4,
                updated_at = $5
            WHERE
                id = $1 AND status = $6
            RETURNING {LEAVE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(processed_by)
        .bind(manager_comment)
        .bind(Utc::now())
        .bind(LeaveStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }
}

fn leave_columns_qualified() -> String {
    LEAVE_COLUMNS
        .split(',')
        .map(|col| format!("r.{}", col.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
