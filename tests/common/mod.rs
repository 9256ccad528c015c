use std::env;
use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use punchclock::config::Config;
use punchclock::database::repositories::{
    AuditRepository, CompanyRepository, LeaveRequestRepository, TimeEntryRepository,
    UserRepository,
};
use punchclock::services::{AuditLogger, AuthService, LeaveService, SystemClock, TimeEntryService};

pub fn setup_test_env() {
    unsafe {
        env::set_var("JWT_SECRET", "test-jwt-secret-key-that-is-long-enough");
        env::set_var("ENVIRONMENT", "test");
    }
}

/// Repositories and services wired against a lazily-connected pool. The
/// connection is only established on first query, so tests that never reach
/// the database (auth extractor failures, input validation) run without a
/// live Postgres.
pub struct TestContext {
    pub pool: PgPool,
    pub config: Config,
    pub user_repository: UserRepository,
    pub auth_service: AuthService,
    pub time_entry_service: TimeEntryService,
    pub leave_service: LeaveService,
    pub audit_logger: AuditLogger,
}

impl TestContext {
    pub fn new() -> Result<Self> {
        setup_test_env();

        let config = Config {
            database_url: env::var("TEST_DATABASE_URL")
                .unwrap_or_else(|_| "postgres://@localhost:5432/punchclock_test".to_string()),
            jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
            jwt_expiration_days: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            reporting_utc_offset_minutes: 0,
        };

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_lazy(&config.database_url)?;

        let user_repository = UserRepository::new(pool.clone());
        let company_repository = CompanyRepository::new(pool.clone());
        let time_entry_repository = TimeEntryRepository::new(pool.clone());
        let leave_request_repository = LeaveRequestRepository::new(pool.clone());
        let audit_repository = AuditRepository::new(pool.clone());

        let clock = Arc::new(SystemClock);
        let auth_service = AuthService::new(user_repository.clone(), config.clone());
        let time_entry_service = TimeEntryService::new(
            time_entry_repository,
            user_repository.clone(),
            company_repository,
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

        Ok(Self {
            pool,
            config,
            user_repository,
            auth_service,
            time_entry_service,
            leave_service,
            audit_logger,
        })
    }
}
