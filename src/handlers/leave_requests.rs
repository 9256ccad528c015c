use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::database::models::{CreateLeaveRequestInput, SubjectType};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::{AuditLogger, LeaveService};

pub async fn create(
    claims: Claims,
    service: web::Data<LeaveService>,
    audit: web::Data<AuditLogger>,
    input: web::Json<CreateLeaveRequestInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let request = service.create(claims.sub, input.into_inner()).await?;

    audit
        .record(
            Some(claims.sub),
            "created",
            SubjectType::LEAVE_REQUEST,
            request.id,
            Some(json!({ "leaveType": request.leave_type.to_string() })),
            &req,
        )
        .await;

    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

pub async fn list_own(
    claims: Claims,
    service: web::Data<LeaveService>,
) -> Result<HttpResponse, AppError> {
    let requests = service.list_own(claims.sub).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}
