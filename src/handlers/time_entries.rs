use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::database::models::{StartTimeEntryInput, StopTimeEntryInput, SubjectType};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::{AuditLogger, TimeEntryService};

/// Clock in. The attendance proof is validated against the caller's work
/// mode; starting while an entry is open is a conflict.
pub async fn start(
    claims: Claims,
    service: web::Data<TimeEntryService>,
    audit: web::Data<AuditLogger>,
    input: web::Json<StartTimeEntryInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let entry = service.start(claims.sub, input.into_inner()).await?;

    audit
        .record(
            Some(claims.sub),
            "created",
            SubjectType::TIME_ENTRY,
            entry.id,
            Some(json!({ "entryType": entry.entry_type.to_string() })),
            &req,
        )
        .await;

    Ok(HttpResponse::Created().json(ApiResponse::success(entry)))
}

/// Clock out of the active entry.
pub async fn stop(
    claims: Claims,
    service: web::Data<TimeEntryService>,
    audit: web::Data<AuditLogger>,
    input: web::Json<StopTimeEntryInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let entry = service.stop(claims.sub, input.into_inner()).await?;

    audit
        .record(
            Some(claims.sub),
            "updated",
            SubjectType::TIME_ENTRY,
            entry.id,
            Some(json!({ "durationSeconds": entry.duration_seconds })),
            &req,
        )
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(entry)))
}

/// The open entry, or null when the caller is not clocked in.
pub async fn get_active(
    claims: Claims,
    service: web::Data<TimeEntryService>,
) -> Result<HttpResponse, AppError> {
    let entry = service.get_active(claims.sub).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(entry)))
}

pub async fn list(
    claims: Claims,
    service: web::Data<TimeEntryService>,
) -> Result<HttpResponse, AppError> {
    let entries = service.list(claims.sub).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(entries)))
}

pub async fn summary(
    claims: Claims,
    service: web::Data<TimeEntryService>,
) -> Result<HttpResponse, AppError> {
    let summary = service.summary(claims.sub).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

pub async fn delete(
    claims: Claims,
    service: web::Data<TimeEntryService>,
    audit: web::Data<AuditLogger>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let entry_id = path.into_inner();

    service.delete(claims.sub, entry_id).await?;

    audit
        .record(
            Some(claims.sub),
            "deleted",
            SubjectType::TIME_ENTRY,
            entry_id,
            None,
            &req,
        )
        .await;

    Ok(HttpResponse::NoContent().finish())
}
