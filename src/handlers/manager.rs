use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::database::models::{AssignScheduleInput, RejectLeaveRequestInput, SubjectType};
use crate::database::repositories::{CompanyRepository, ScheduleRepository, UserRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::{access, presence, AuditLogger, LeaveService, TimeEntryService};

/// All time entries of one employee. Managers are scoped to their own
/// company; admins see everyone.
pub async fn employee_time_entries(
    claims: Claims,
    users: web::Data<UserRepository>,
    service: web::Data<TimeEntryService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    access::ensure_manager_role(&claims)?;

    let target = users
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    access::ensure_company_scope(&claims, &target)?;

    let entries = service.list(target.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(entries)))
}

pub async fn company_statistics(
    claims: Claims,
    service: web::Data<TimeEntryService>,
) -> Result<HttpResponse, AppError> {
    access::ensure_manager_role(&claims)?;

    let company_id = claims
        .company_id
        .ok_or_else(|| AppError::Validation("Caller has no company.".to_string()))?;

    let stats = service.company_statistics(company_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

pub async fn pending_leave_requests(
    claims: Claims,
    service: web::Data<LeaveService>,
) -> Result<HttpResponse, AppError> {
    access::ensure_manager_role(&claims)?;

    let requests = service.list_pending_for_manager(claims.sub).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

pub async fn approve_leave_request(
    claims: Claims,
    service: web::Data<LeaveService>,
    audit: web::Data<AuditLogger>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    access::ensure_manager_role(&claims)?;

    let request = service.approve(claims.sub, path.into_inner()).await?;

    audit
        .record(
            Some(claims.sub),
            "approved",
            SubjectType::LEAVE_REQUEST,
            request.id,
            None,
            &req,
        )
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

pub async fn reject_leave_request(
    claims: Claims,
    service: web::Data<LeaveService>,
    audit: web::Data<AuditLogger>,
    path: web::Path<Uuid>,
    input: web::Json<RejectLeaveRequestInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    access::ensure_manager_role(&claims)?;

    let request = service
        .reject(claims.sub, path.into_inner(), &input.manager_comments)
        .await?;

    audit
        .record(
            Some(claims.sub),
            "rejected",
            SubjectType::LEAVE_REQUEST,
            request.id,
            Some(json!({ "managerComment": request.manager_comment })),
            &req,
        )
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Reassign a direct report's work schedule. The schedule must belong to
/// the manager's company; anything else reads as not found.
pub async fn assign_work_schedule(
    claims: Claims,
    users: web::Data<UserRepository>,
    schedules: web::Data<ScheduleRepository>,
    audit: web::Data<AuditLogger>,
    path: web::Path<Uuid>,
    input: web::Json<AssignScheduleInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    access::ensure_manager_role(&claims)?;

    let target = users
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    access::ensure_direct_report(&claims, &target)?;

    let schedule = schedules
        .find_by_id(input.work_schedule_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Work schedule not found".to_string()))?;

    access::ensure_schedule_visible(&claims, schedule.company_id)?;

    let updated = users
        .assign_work_schedule(target.id, schedule.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    audit
        .record(
            Some(claims.sub),
            "updated",
            SubjectType::USER,
            updated.id,
            Some(json!({ "workScheduleId": schedule.id })),
            &req,
        )
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

/// Today's rotating QR code for the manager's company, for display at the
/// office entrance.
pub async fn company_qr_code(
    claims: Claims,
    companies: web::Data<CompanyRepository>,
    service: web::Data<TimeEntryService>,
) -> Result<HttpResponse, AppError> {
    access::ensure_manager_role(&claims)?;

    let company_id = claims
        .company_id
        .ok_or_else(|| AppError::Validation("Caller has no company.".to_string()))?;

    let company = companies
        .find_by_id(company_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;

    let secret = company.qr_secret.as_deref().ok_or_else(|| {
        AppError::Validation("Company has no QR attendance configured.".to_string())
    })?;

    let today = service.reporting_today();
    let code = presence::daily_code(secret, today);

    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
        "code": code,
        "validOn": today,
    }))))
}
