use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Company;

const COMPANY_COLUMNS: &str = r#"
    id,
    name,
    latitude,
    longitude,
    radius_meters,
    qr_secret,
    manager_id,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_company(
        &self,
        name: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
        radius_meters: Option<f64>,
        qr_secret: &str,
        manager_id: Uuid,
    ) -> Result<Company, sqlx::Error> {
        let now = Utc::now();

        let company = sqlx::query_as::<_, Company>(&format!(
            r#"
            INSERT INTO
                companies (id, name, latitude, longitude, radius_meters, qr_secret,
                           manager_id, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COMPANY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(latitude)
        .bind(longitude)
        .bind(radius_meters)
        .bind(qr_secret)
        .bind(manager_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(company)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }
}
