//! Storage-level behavior that only a live database can exercise: the
//! duration clamp computed inside the close statement and the transactional
//! default-schedule move. Ignored by default; run with a migrated Postgres
//! reachable via TEST_DATABASE_URL:
//!
//!   cargo test --test storage_invariant_tests -- --ignored

use std::env;

use chrono::{Duration, NaiveTime, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use serial_test::serial;
use uuid::Uuid;

use punchclock::database::init_database;
use punchclock::database::models::{DailyScheduleInput, EntryType, User};
use punchclock::database::repositories::{
    CompanyRepository, ScheduleRepository, TimeEntryRepository, UserRepository,
};

async fn test_pool() -> sqlx::PgPool {
    let url = env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://@localhost:5432/punchclock_test".to_string());
    init_database(&url).await.expect("test database unavailable")
}

async fn seeded_user(pool: &sqlx::PgPool) -> User {
    let users = UserRepository::new(pool.clone());
    let user = User::new(SafeEmail().fake(), "hash".to_string(), "Test User".to_string());
    users.create_user(&user).await.unwrap();
    user
}

fn full_week() -> Vec<DailyScheduleInput> {
    (0..7)
        .map(|day_of_week| DailyScheduleInput {
            day_of_week,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            break_duration_minutes: 30,
            is_working_day: day_of_week < 5,
        })
        .collect()
}

#[actix_web::test]
#[serial]
#[ignore]
async fn closing_an_entry_that_started_in_the_future_clamps_duration_to_zero() {
    let pool = test_pool().await;
    let entries = TimeEntryRepository::new(pool.clone());
    let user = seeded_user(&pool).await;

    let now = Utc::now();
    entries
        .insert_entry(
            user.id,
            now + Duration::minutes(5),
            EntryType::Remote,
            None,
            None,
            None,
        )
        .await
        .unwrap();

    let closed = entries.close_active(user.id, now, None).await.unwrap().unwrap();

    assert_eq!(closed.duration_seconds, Some(0));
}

#[actix_web::test]
#[serial]
#[ignore]
async fn moving_the_default_to_an_unknown_schedule_keeps_the_current_default() {
    let pool = test_pool().await;
    let user = seeded_user(&pool).await;
    let companies = CompanyRepository::new(pool.clone());
    let schedules = ScheduleRepository::new(pool.clone());

    let company = companies
        .create_company(
            &format!("Test Co {}", Uuid::new_v4()),
            None,
            None,
            None,
            "qr-secret",
            user.id,
        )
        .await
        .unwrap();
    let default = schedules
        .create_schedule(company.id, "Standard", true, &full_week())
        .await
        .unwrap();

    let moved = schedules.set_default(company.id, Uuid::new_v4()).await.unwrap();
    assert!(moved.is_none());

    let all = schedules.list_for_company(company.id).await.unwrap();
    assert!(all.iter().any(|s| s.id == default.id && s.is_default));
}
