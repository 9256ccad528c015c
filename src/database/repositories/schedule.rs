use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{DailySchedule, DailyScheduleInput, WorkSchedule};

const SCHEDULE_COLUMNS: &str = r#"
    id,
    company_id,
    name,
    is_default,
    created_at,
    updated_at
"#;

const DAILY_COLUMNS: &str = r#"
    id,
    work_schedule_id,
    day_of_week,
    start_time,
    end_time,
    break_duration_minutes,
    is_working_day
"#;

#[derive(Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a schedule with its seven daily rows in one transaction.
    /// When the new schedule is the default, the company's previous default
    /// is unset in the same transaction so the partial unique index never
    /// sees two defaults.
    pub async fn create_schedule(
        &self,
        company_id: Uuid,
        name: &str,
        is_default: bool,
        days: &[DailyScheduleInput],
    ) -> Result<WorkSchedule, sqlx::Error> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        if is_default {
            sqlx::query(
                "UPDATE work_schedules SET is_default = FALSE, updated_at = $1 WHERE company_id = $2 AND is_default",
            )
            .bind(now)
            .bind(company_id)
            .execute(&mut *tx)
            .await?;
        }

        let schedule = sqlx::query_as::<_, WorkSchedule>(&format!(
            r#"
            INSERT INTO
                work_schedules (id, company_id, name, is_default, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6)
            RETURNING {SCHEDULE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(name)
        .bind(is_default)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for day in days {
            sqlx::query(
                r#"
                INSERT INTO
                    daily_schedules (id, work_schedule_id, day_of_week, start_time, end_time,
                                     break_duration_minutes, is_working_day)
                VALUES
                    ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(schedule.id)
            .bind(day.day_of_week)
            .bind(day.start_time)
            .bind(day.end_time)
            .bind(day.break_duration_minutes)
            .bind(day.is_working_day)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(schedule)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<WorkSchedule>, sqlx::Error> {
        let schedule = sqlx::query_as::<_, WorkSchedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM work_schedules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(schedule)
    }

    pub async fn days_for_schedule(
        &self,
        schedule_id: Uuid,
    ) -> Result<Vec<DailySchedule>, sqlx::Error> {
        let days = sqlx::query_as::<_, DailySchedule>(&format!(
            "SELECT {DAILY_COLUMNS} FROM daily_schedules WHERE work_schedule_id = $1 ORDER BY day_of_week"
        ))
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(days)
    }

    pub async fn list_for_company(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<WorkSchedule>, sqlx::Error> {
        let schedules = sqlx::query_as::<_, WorkSchedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM work_schedules WHERE company_id = $1 ORDER BY created_at"
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(schedules)
    }

    /// Atomically move the default flag to the given schedule.
    pub async fn set_default(
        &self,
        company_id: Uuid,
        schedule_id: Uuid,
    ) -> Result<Option<WorkSchedule>, sqlx::Error> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE work_schedules SET is_default = FALSE, updated_at = $1 WHERE company_id = $2 AND is_default",
        )
        .bind(now)
        .bind(company_id)
        .execute(&mut *tx)
        .await?;

        let schedule = sqlx::query_as::<_, WorkSchedule>(&format!(
            r#"
            UPDATE work_schedules
            SET is_default = TRUE, updated_at = $1
            WHERE id = $2 AND company_id = $3
            RETURNING {SCHEDULE_COLUMNS}
            "#
        ))
        .bind(now)
        .bind(schedule_id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?;

        // Unknown or foreign schedule id: the previous default must survive,
        // so the unset above is rolled back rather than committed.
        let Some(schedule) = schedule else {
            tx.rollback().await?;
            return Ok(None);
        };

        tx.commit().await?;

        Ok(Some(schedule))
    }
}
