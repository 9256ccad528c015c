use actix_web::{web, HttpRequest, HttpResponse};
use rand::distr::{Alphanumeric, SampleString};
use serde_json::json;

use crate::database::models::{CreateCompanyInput, SubjectType, UserRole};
use crate::database::repositories::{CompanyRepository, UserRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::AuditLogger;

const QR_SECRET_LENGTH: usize = 32;

/// Create a company. The caller becomes its manager and is attached to it.
pub async fn create(
    claims: Claims,
    companies: web::Data<CompanyRepository>,
    users: web::Data<UserRepository>,
    audit: web::Data<AuditLogger>,
    input: web::Json<CreateCompanyInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();

    if input.name.trim().is_empty() {
        return Err(AppError::Validation("Company name cannot be empty.".to_string()));
    }

    if claims.company_id.is_some() {
        return Err(AppError::Conflict(
            "User already belongs to a company.".to_string(),
        ));
    }

    let qr_secret = Alphanumeric.sample_string(&mut rand::rng(), QR_SECRET_LENGTH);

    let company = companies
        .create_company(
            input.name.trim(),
            input.latitude,
            input.longitude,
            input.radius_meters,
            &qr_secret,
            claims.sub,
        )
        .await?;

    users
        .attach_to_company(claims.sub, company.id, UserRole::Manager)
        .await?;

    audit
        .record(
            Some(claims.sub),
            "created",
            SubjectType::COMPANY,
            company.id,
            Some(json!({ "name": company.name })),
            &req,
        )
        .await;

    Ok(HttpResponse::Created().json(ApiResponse::success(company)))
}

/// The caller's own company.
pub async fn get_own(
    claims: Claims,
    companies: web::Data<CompanyRepository>,
) -> Result<HttpResponse, AppError> {
    let company_id = claims
        .company_id
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;

    let company = companies
        .find_by_id(company_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(company)))
}
