use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::CreateAuditLogInput;

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, input: CreateAuditLogInput) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO
                audit_logs (id, actor_id, action, subject_type, subject_id, details,
                            ip_address, user_agent, created_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.actor_id)
        .bind(input.action)
        .bind(input.subject_type)
        .bind(input.subject_id)
        .bind(input.details)
        .bind(input.ip_address)
        .bind(input.user_agent)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
