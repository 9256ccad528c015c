use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use punchclock::database::{
    init_database,
    repositories::{
        AuditRepository, CompanyRepository, LeaveRequestRepository, ScheduleRepository,
        TimeEntryRepository, UserRepository,
    },
};
use punchclock::handlers::{
    admin, auth, companies, leave_requests, manager, schedules, time_entries,
};
use punchclock::middleware::RequestIdMiddleware;
use punchclock::services::{AuditLogger, AuthService, LeaveService, SystemClock, TimeEntryService};
use punchclock::{AppState, Config};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Punchclock API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    println!("🚀 Starting Punchclock API server...");

    // Load configuration
    let config = Config::from_env()?;
    println!(
        "📋 Configuration loaded (environment: {})",
        config.environment
    );

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    println!("✅ Database initialized");

    // Initialize repositories and services
    let user_repository = UserRepository::new(pool.clone());
    let company_repository = CompanyRepository::new(pool.clone());
    let schedule_repository = ScheduleRepository::new(pool.clone());
    let time_entry_repository = TimeEntryRepository::new(pool.clone());
    let leave_request_repository = LeaveRequestRepository::new(pool.clone());
    let audit_repository = AuditRepository::new(pool.clone());

    let clock = Arc::new(SystemClock);
    let auth_service = AuthService::new(user_repository.clone(), config.clone());
    let time_entry_service = TimeEntryService::new(
        time_entry_repository,
        user_repository.clone(),
        company_repository.clone(),
        clock.clone(),
        config.reporting_offset(),
    );
    let leave_service = LeaveService::new(
        leave_request_repository,
        user_repository.clone(),
        clock,
        config.reporting_offset(),
    );
    let audit_logger = AuditLogger::new(audit_repository);

    let app_state = web::Data::new(AppState { auth_service });
    let user_repo_data = web::Data::new(user_repository);
    let company_repo_data = web::Data::new(company_repository);
    let schedule_repo_data = web::Data::new(schedule_repository);
    let time_entry_service_data = web::Data::new(time_entry_service);
    let leave_service_data = web::Data::new(leave_service);
    let audit_logger_data = web::Data::new(audit_logger);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    println!("🌐 Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(user_repo_data.clone())
            .app_data(company_repo_data.clone())
            .app_data(schedule_repo_data.clone())
            .app_data(time_entry_service_data.clone())
            .app_data(leave_service_data.clone())
            .app_data(audit_logger_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(auth::register))
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    )
                    .service(
                        web::scope("/time-entries")
                            .route("", web::post().to(time_entries::start))
                            .route("/active/stop", web::patch().to(time_entries::stop))
                            .route("/active", web::get().to(time_entries::get_active))
                            .route("", web::get().to(time_entries::list))
                            .route("/summary/me", web::get().to(time_entries::summary))
                            .route("/{id}", web::delete().to(time_entries::delete)),
                    )
                    .service(
                        web::scope("/leave-requests")
                            .route("", web::post().to(leave_requests::create))
                            .route("", web::get().to(leave_requests::list_own)),
                    )
                    .service(
                        web::scope("/manager")
                            .route(
                                "/users/{id}/time-entries",
                                web::get().to(manager::employee_time_entries),
                            )
                            .route("/statistics", web::get().to(manager::company_statistics))
                            .route(
                                "/leave-requests",
                                web::get().to(manager::pending_leave_requests),
                            )
                            .route(
                                "/leave-requests/{id}/approve",
                                web::post().to(manager::approve_leave_request),
                            )
                            .route(
                                "/leave-requests/{id}/reject",
                                web::post().to(manager::reject_leave_request),
                            )
                            .route(
                                "/users/{id}/work-schedule",
                                web::put().to(manager::assign_work_schedule),
                            )
                            .route(
                                "/company/qr-code",
                                web::get().to(manager::company_qr_code),
                            ),
                    )
                    .service(
                        web::scope("/companies")
                            .route("", web::post().to(companies::create))
                            .route("/me", web::get().to(companies::get_own))
                            .route(
                                "/{id}/users",
                                web::get().to(admin::list_company_users),
                            ),
                    )
                    .service(
                        web::scope("/work-schedules")
                            .route("", web::post().to(schedules::create))
                            .route("", web::get().to(schedules::list))
                            .route("/{id}", web::get().to(schedules::get))
                            .route("/{id}/default", web::put().to(schedules::set_default)),
                    )
                    .service(
                        web::scope("/admin")
                            .route("/users/{id}/role", web::put().to(admin::update_role))
                            .route("/users/{id}", web::put().to(admin::update_user)),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
