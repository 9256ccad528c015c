use std::collections::HashSet;

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::database::models::{
    CreateWorkScheduleInput, DailyScheduleInput, SubjectType, WorkScheduleWithDays,
};
use crate::database::repositories::ScheduleRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::{access, AuditLogger};

/// Create a work schedule for the caller's company. Exactly one row per
/// weekday is required.
pub async fn create(
    claims: Claims,
    schedules: web::Data<ScheduleRepository>,
    audit: web::Data<AuditLogger>,
    input: web::Json<CreateWorkScheduleInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    access::ensure_manager_role(&claims)?;

    let company_id = claims
        .company_id
        .ok_or_else(|| AppError::Validation("Caller has no company.".to_string()))?;

    let input = input.into_inner();
    validate_schedule_input(&input.name, &input.days)?;

    let schedule = schedules
        .create_schedule(company_id, input.name.trim(), input.is_default, &input.days)
        .await?;

    audit
        .record(
            Some(claims.sub),
            "created",
            SubjectType::WORK_SCHEDULE,
            schedule.id,
            Some(json!({ "name": schedule.name, "isDefault": schedule.is_default })),
            &req,
        )
        .await;

    Ok(HttpResponse::Created().json(ApiResponse::success(schedule)))
}

pub async fn get(
    claims: Claims,
    schedules: web::Data<ScheduleRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let schedule = schedules
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Work schedule not found".to_string()))?;

    access::ensure_schedule_visible(&claims, schedule.company_id)?;

    let days = schedules.days_for_schedule(schedule.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(WorkScheduleWithDays { schedule, days })))
}

pub async fn list(
    claims: Claims,
    schedules: web::Data<ScheduleRepository>,
) -> Result<HttpResponse, AppError> {
    let company_id = claims
        .company_id
        .ok_or_else(|| AppError::Validation("Caller has no company.".to_string()))?;

    let schedules = schedules.list_for_company(company_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(schedules)))
}

/// Move the company default to the given schedule.
pub async fn set_default(
    claims: Claims,
    schedules: web::Data<ScheduleRepository>,
    audit: web::Data<AuditLogger>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    access::ensure_manager_role(&claims)?;

    let company_id = claims
        .company_id
        .ok_or_else(|| AppError::Validation("Caller has no company.".to_string()))?;

    let schedule = schedules
        .set_default(company_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Work schedule not found".to_string()))?;

    audit
        .record(
            Some(claims.sub),
            "updated",
            SubjectType::WORK_SCHEDULE,
            schedule.id,
            Some(json!({ "isDefault": true })),
            &req,
        )
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(schedule)))
}

fn validate_schedule_input(name: &str, days: &[DailyScheduleInput]) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Schedule name cannot be empty.".to_string()));
    }

    if days.len() != 7 {
        return Err(AppError::Unprocessable(
            "A work schedule requires exactly seven daily entries.".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for day in days {
        if !(0..=6).contains(&day.day_of_week) {
            return Err(AppError::Unprocessable(
                "Day of week must be between 0 and 6.".to_string(),
            ));
        }
        if !seen.insert(day.day_of_week) {
            return Err(AppError::Unprocessable(
                "Duplicate day of week in schedule.".to_string(),
            ));
        }
        if day.is_working_day && day.end_time <= day.start_time {
            return Err(AppError::Unprocessable(
                "End time must be after start time on working days.".to_string(),
            ));
        }
    }

    Ok(())
}
