use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{User, UserRole, WorkMode};

const USER_COLUMNS: &str = r#"
    id,
    email,
    password_hash,
    name,
    role,
    company_id,
    manager_id,
    work_schedule_id,
    pin_code_hash,
    work_mode,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO
                users (id, email, password_hash, name, role, company_id, manager_id,
                       work_schedule_id, pin_code_hash, work_mode, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role)
        .bind(user.company_id)
        .bind(user.manager_id)
        .bind(user.work_schedule_id)
        .bind(&user.pin_code_hash)
        .bind(user.work_mode)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE company_id = $1 ORDER BY name"
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn update_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET role = $1, updated_at = $2
            WHERE id = $3
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(role)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn update_roster_fields(
        &self,
        id: Uuid,
        company_id: Option<Uuid>,
        manager_id: Option<Uuid>,
        work_mode: Option<WorkMode>,
        pin_code_hash: Option<String>,
    ) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET
                company_id = COALESCE($1, company_id),
                manager_id = COALESCE($2, manager_id),
                work_mode = COALESCE($3, work_mode),
                pin_code_hash = COALESCE($4, pin_code_hash),
                updated_at = $5
            WHERE id = $6
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(company_id)
        .bind(manager_id)
        .bind(work_mode)
        .bind(pin_code_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn assign_work_schedule(
        &self,
        id: Uuid,
        work_schedule_id: Uuid,
    ) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET work_schedule_id = $1, updated_at = $2
            WHERE id = $3
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(work_schedule_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn attach_to_company(
        &self,
        id: Uuid,
        company_id: Uuid,
        role: UserRole,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET company_id = $1, role = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(company_id)
        .bind(role)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
