use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{EntryType, TimeEntry};

const ENTRY_COLUMNS: &str = r#"
    id,
    user_id,
    start_time,
    stop_time,
    duration_seconds,
    entry_type,
    latitude,
    longitude,
    start_comment,
    stop_comment,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct TimeEntryRepository {
    pool: PgPool,
}

impl TimeEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an open entry. The partial unique index on
    /// (user_id) WHERE stop_time IS NULL makes this the serialization point
    /// for concurrent starts; callers translate the unique violation.
    pub async fn insert_entry(
        &self,
        user_id: Uuid,
        start_time: DateTime<Utc>,
        entry_type: EntryType,
        latitude: Option<f64>,
        longitude: Option<f64>,
        start_comment: Option<String>,
    ) -> Result<TimeEntry, sqlx::Error> {
        let entry = sqlx::query_as::<_, TimeEntry>(&format!(
            r#"
            INSERT INTO
                time_entries (id, user_id, start_time, entry_type, latitude, longitude,
                              start_comment, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(start_time)
        .bind(entry_type)
        .bind(latitude)
        .bind(longitude)
        .bind(start_comment)
        .bind(start_time)
        .bind(start_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn find_active(&self, user_id: Uuid) -> Result<Option<TimeEntry>, sqlx::Error> {
        let entry = sqlx::query_as::<_, TimeEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM time_entries WHERE user_id = $1 AND stop_time IS NULL"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Close the user's open entry in a single conditional UPDATE so a
    /// racing double-stop loses cleanly (returns None). Duration is
    /// computed and clamped to zero inside the statement, keeping the close
    /// all-or-nothing.
    pub async fn close_active(
        &self,
        user_id: Uuid,
        stop_time: DateTime<Utc>,
        stop_comment: Option<String>,
    ) -> Result<Option<TimeEntry>, sqlx::Error> {
        let entry = sqlx::query_as::<_, TimeEntry>(&format!(
            r#"
            UPDATE time_entries
            SET
                stop_time = $2,
                duration_seconds = GREATEST(0, EXTRACT(EPOCH FROM ($2 - start_time))::BIGINT),
                stop_comment = $3,
                updated_at = $2
            WHERE
                user_id = $1 AND stop_time IS NULL
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(stop_time)
        .bind(stop_comment)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeEntry>, sqlx::Error> {
        let entry = sqlx::query_as::<_, TimeEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM time_entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let entries = sqlx::query_as::<_, TimeEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM time_entries WHERE user_id = $1 ORDER BY start_time DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn list_closed_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let entries = sqlx::query_as::<_, TimeEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM time_entries
            WHERE user_id = $1 AND stop_time IS NOT NULL
            ORDER BY start_time DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn list_closed_for_company(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let entries = sqlx::query_as::<_, TimeEntry>(&format!(
            r#"
            SELECT {}
            FROM time_entries e
            JOIN users u ON u.id = e.user_id
            WHERE u.company_id = $1 AND e.stop_time IS NOT NULL
            ORDER BY e.start_time DESC
            "#,
            entry_columns_qualified()
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn count_active_for_company(
        &self,
        company_id: Uuid,
    ) -> Result<(i64, i64), sqlx::Error> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(DISTINCT e.user_id)
            FROM time_entries e
            JOIN users u ON u.id = e.user_id
            WHERE u.company_id = $1 AND e.stop_time IS NULL
            "#,
        )
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_entry(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM time_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn entry_columns_qualified() -> String {
    ENTRY_COLUMNS
        .split(',')
        .map(|col| format!("e.{}", col.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
