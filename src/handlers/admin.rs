use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::database::models::{SubjectType, UpdateRoleInput, UpdateUserInput, UserInfo, UserRole};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::{access, AuditLogger};

pub async fn update_role(
    claims: Claims,
    users: web::Data<UserRepository>,
    audit: web::Data<AuditLogger>,
    path: web::Path<Uuid>,
    input: web::Json<UpdateRoleInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    access::ensure_admin_role(&claims)?;

    let user = users
        .update_role(path.into_inner(), input.role)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    audit
        .record(
            Some(claims.sub),
            "updated",
            SubjectType::USER,
            user.id,
            Some(json!({ "role": user.role.to_string() })),
            &req,
        )
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
}

/// Rewrite roster fields for any user. Omitted fields keep their value.
pub async fn update_user(
    claims: Claims,
    users: web::Data<UserRepository>,
    audit: web::Data<AuditLogger>,
    path: web::Path<Uuid>,
    input: web::Json<UpdateUserInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    access::ensure_admin_role(&claims)?;

    let input = input.into_inner();

    let pin_code_hash = match input.pin_code.as_deref() {
        Some(pin) => {
            if pin.len() < 4 {
                return Err(AppError::Unprocessable(
                    "Pin code must be at least 4 characters.".to_string(),
                ));
            }
            Some(
                bcrypt::hash(pin, bcrypt::DEFAULT_COST)
                    .map_err(|err| AppError::InternalServerError(Some(err.to_string())))?,
            )
        }
        None => None,
    };

    let user = users
        .update_roster_fields(
            path.into_inner(),
            input.company_id,
            input.manager_id,
            input.work_mode,
            pin_code_hash,
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    audit
        .record(
            Some(claims.sub),
            "updated",
            SubjectType::USER,
            user.id,
            Some(json!({
                "companyId": user.company_id,
                "managerId": user.manager_id,
                "workMode": user.work_mode.to_string(),
            })),
            &req,
        )
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
}

pub async fn list_company_users(
    claims: Claims,
    users: web::Data<UserRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    access::ensure_manager_role(&claims)?;

    let company_id = path.into_inner();
    if claims.role != UserRole::Admin && claims.company_id != Some(company_id) {
        return Err(AppError::Forbidden(
            "Access denied to another company's roster.".to_string(),
        ));
    }

    let members: Vec<UserInfo> = users
        .list_by_company(company_id)
        .await?
        .into_iter()
        .map(UserInfo::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(members)))
}
