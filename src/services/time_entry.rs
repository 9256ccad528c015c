use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use uuid::Uuid;

use crate::database::models::{
    CompanyStatistics, PeriodStats, StartTimeEntryInput, StopTimeEntryInput, TimeEntry,
    TimeSummary,
};
use crate::database::repositories::{CompanyRepository, TimeEntryRepository, UserRepository};
use crate::error::{is_unique_violation, AppError};
use crate::services::clock::Clock;
use crate::services::presence::{self, PresenceClaim};

/// Manages the open/closed lifecycle of attendance records and validates
/// the attendance method at start time. One open entry per user at most;
/// the storage layer backs that up with a partial unique index so
/// concurrent starts cannot both succeed.
#[derive(Clone)]
pub struct TimeEntryService {
    entries: TimeEntryRepository,
    users: UserRepository,
    companies: CompanyRepository,
    clock: Arc<dyn Clock>,
    reporting_offset: FixedOffset,
}

impl TimeEntryService {
    pub fn new(
        entries: TimeEntryRepository,
        users: UserRepository,
        companies: CompanyRepository,
        clock: Arc<dyn Clock>,
        reporting_offset: FixedOffset,
    ) -> Self {
        Self {
            entries,
            users,
            companies,
            clock,
            reporting_offset,
        }
    }

    /// Current date in the reporting offset, from the injected clock.
    /// Drives daily QR rotation.
    pub fn reporting_today(&self) -> NaiveDate {
        self.clock
            .now()
            .with_timezone(&self.reporting_offset)
            .date_naive()
    }

    pub async fn start(
        &self,
        user_id: Uuid,
        input: StartTimeEntryInput,
    ) -> Result<TimeEntry, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if self.entries.find_active(user_id).await?.is_some() {
            return Err(AppError::ClockInConflict(
                "User already has an active time entry.".to_string(),
            ));
        }

        let company = match user.company_id {
            Some(company_id) => self.companies.find_by_id(company_id).await?,
            None => None,
        };

        let now = self.clock.now();
        let today = now.with_timezone(&self.reporting_offset).date_naive();
        let claim = PresenceClaim {
            latitude: input.latitude,
            longitude: input.longitude,
            qr_code: input.qr_code.as_deref(),
        };

        let entry_type = presence::verify_presence(user.work_mode, company.as_ref(), &claim, today)?;

        // The insert and the "no active entry" check race under concurrency;
        // the partial unique index decides the winner and the loser gets the
        // same conflict error as the pre-check.
        let entry = self
            .entries
            .insert_entry(
                user_id,
                now,
                entry_type,
                input.latitude,
                input.longitude,
                input.comment,
            )
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::ClockInConflict("User already has an active time entry.".to_string())
                } else {
                    err.into()
                }
            })?;

        Ok(entry)
    }

    pub async fn stop(
        &self,
        user_id: Uuid,
        input: StopTimeEntryInput,
    ) -> Result<TimeEntry, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if self.entries.find_active(user_id).await?.is_none() {
            return Err(AppError::NotFound(
                "No active time entry to stop.".to_string(),
            ));
        }

        if let Some(pin_hash) = &user.pin_code_hash {
            let pin = input
                .pin_code
                .as_deref()
                .ok_or_else(|| AppError::Validation("Invalid pin code.".to_string()))?;

            let matches = bcrypt::verify(pin, pin_hash)
                .map_err(|e| AppError::internal_server_error_message(e.to_string()))?;

            if !matches {
                return Err(AppError::Validation("Invalid pin code.".to_string()));
            }
        }

        let now = self.clock.now();
        let entry = self
            .entries
            .close_active(user_id, now, input.comment)
            .await?
            .ok_or_else(|| AppError::NotFound("No active time entry to stop.".to_string()))?;

        if now < entry.start_time {
            log::warn!(
                "time entry {} closed before it started (clock skew?); duration clamped to zero",
                entry.id
            );
        }

        Ok(entry)
    }

    pub async fn get_active(&self, user_id: Uuid) -> Result<Option<TimeEntry>, AppError> {
        Ok(self.entries.find_active(user_id).await?)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<TimeEntry>, AppError> {
        Ok(self.entries.list_for_user(user_id).await?)
    }

    pub async fn summary(&self, user_id: Uuid) -> Result<TimeSummary, AppError> {
        let entries = self.entries.list_closed_for_user(user_id).await?;
        Ok(summarize(&entries, self.clock.now(), self.reporting_offset))
    }

    pub async fn delete(&self, user_id: Uuid, entry_id: Uuid) -> Result<(), AppError> {
        let entry = self
            .entries
            .find_by_id(entry_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Time entry not found".to_string()))?;

        if entry.user_id != user_id {
            return Err(AppError::Forbidden(
                "Time entry does not belong to the caller.".to_string(),
            ));
        }

        self.entries.delete_entry(entry_id).await?;
        Ok(())
    }

    pub async fn company_statistics(
        &self,
        company_id: Uuid,
    ) -> Result<CompanyStatistics, AppError> {
        let closed = self.entries.list_closed_for_company(company_id).await?;
        let (active_entries, active_employees) =
            self.entries.count_active_for_company(company_id).await?;

        let mut stats = aggregate_company(&closed, self.clock.now(), self.reporting_offset);
        stats.active_entries = active_entries;
        stats.active_employees = active_employees;

        Ok(stats)
    }
}

/// Aggregate a user's closed entries into total/today/week/month buckets.
/// Pure in (entries, now, offset); period membership is decided by the
/// entry's start_time in the reporting offset, with ISO week numbering.
pub fn summarize(
    entries: &[TimeEntry],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> TimeSummary {
    let local_now = now.with_timezone(&offset).date_naive();
    let current_week = local_now.iso_week();

    let mut summary = TimeSummary::default();

    for entry in entries {
        let Some(duration) = entry.duration_seconds else {
            continue;
        };

        summary.total_seconds += duration;

        let local_start = entry.start_time.with_timezone(&offset).date_naive();
        if local_start == local_now {
            summary.today_seconds += duration;
        }
        if local_start.iso_week() == current_week {
            summary.week_seconds += duration;
        }
        if local_start.year() == local_now.year() && local_start.month() == local_now.month() {
            summary.month_seconds += duration;
        }
    }

    summary
}

/// Company-wide closed-entry aggregates; active-entry counts are filled in
/// by the caller from the store. Each period sums whole seconds and
/// converts to minutes once, so sub-minute entries are not lost to
/// per-entry truncation.
pub fn aggregate_company(
    closed: &[TimeEntry],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> CompanyStatistics {
    let local_now = now.with_timezone(&offset).date_naive();
    let current_week = local_now.iso_week();

    let mut stats = CompanyStatistics::default();
    let mut today = PeriodAccum::default();
    let mut week = PeriodAccum::default();
    let mut month = PeriodAccum::default();

    for entry in closed {
        let Some(duration) = entry.duration_seconds else {
            continue;
        };

        stats.total_seconds += duration;

        let local_start = entry.start_time.with_timezone(&offset).date_naive();
        if local_start == local_now {
            today.add(duration);
        }
        if local_start.iso_week() == current_week {
            week.add(duration);
        }
        if local_start.year() == local_now.year() && local_start.month() == local_now.month() {
            month.add(duration);
        }
    }

    stats.today = today.finish();
    stats.week = week.finish();
    stats.month = month.finish();

    stats
}

#[derive(Default)]
struct PeriodAccum {
    entries: i64,
    seconds: i64,
}

impl PeriodAccum {
    fn add(&mut self, duration_seconds: i64) {
        self.entries += 1;
        self.seconds += duration_seconds;
    }

    fn finish(self) -> PeriodStats {
        PeriodStats {
            entries: self.entries,
            minutes: self.seconds / 60,
            hours: self.seconds as f64 / 3600.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::EntryType;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn utc_offset() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn closed_entry(start: DateTime<Utc>, duration_seconds: i64) -> TimeEntry {
        TimeEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_time: start,
            stop_time: Some(start + chrono::Duration::seconds(duration_seconds)),
            duration_seconds: Some(duration_seconds),
            entry_type: EntryType::Remote,
            latitude: None,
            longitude: None,
            start_comment: None,
            stop_comment: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn summary_of_no_entries_is_zero() {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        assert_eq!(summarize(&[], now, utc_offset()), TimeSummary::default());
    }

    #[test]
    fn summary_buckets_by_day_week_and_month() {
        // Wednesday 2025-06-18.
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let entries = vec![
            // Today: counted everywhere.
            closed_entry(Utc.with_ymd_and_hms(2025, 6, 18, 9, 0, 0).unwrap(), 3600),
            // Monday same ISO week: week + month + total.
            closed_entry(Utc.with_ymd_and_hms(2025, 6, 16, 9, 0, 0).unwrap(), 1800),
            // Earlier in June, previous week: month + total.
            closed_entry(Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(), 600),
            // Previous month: total only.
            closed_entry(Utc.with_ymd_and_hms(2025, 5, 20, 9, 0, 0).unwrap(), 60),
        ];

        let summary = summarize(&entries, now, utc_offset());
        assert_eq!(summary.today_seconds, 3600);
        assert_eq!(summary.week_seconds, 5400);
        assert_eq!(summary.month_seconds, 6000);
        assert_eq!(summary.total_seconds, 6060);
    }

    #[test]
    fn summary_ignores_open_entries() {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let mut open = closed_entry(now, 3600);
        open.stop_time = None;
        open.duration_seconds = None;

        assert_eq!(summarize(&[open], now, utc_offset()), TimeSummary::default());
    }

    #[test]
    fn summary_respects_the_reporting_offset() {
        // 23:30 UTC on the 17th is already the 18th at UTC+2.
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let entry = closed_entry(Utc.with_ymd_and_hms(2025, 6, 17, 23, 30, 0).unwrap(), 900);

        let summary = summarize(&[entry], now, offset);
        assert_eq!(summary.today_seconds, 900);
    }

    #[test]
    fn iso_week_does_not_leak_into_the_next_week() {
        // Sunday 2025-06-15 belongs to the previous ISO week of Wednesday
        // 2025-06-18.
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let entry = closed_entry(Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap(), 1200);

        let summary = summarize(&[entry], now, utc_offset());
        assert_eq!(summary.week_seconds, 0);
        assert_eq!(summary.month_seconds, 1200);
    }

    #[test]
    fn company_aggregates_count_entries_and_minutes() {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let entries = vec![
            closed_entry(Utc.with_ymd_and_hms(2025, 6, 18, 8, 0, 0).unwrap(), 3600),
            closed_entry(Utc.with_ymd_and_hms(2025, 6, 18, 10, 0, 0).unwrap(), 1800),
        ];

        let stats = aggregate_company(&entries, now, utc_offset());
        assert_eq!(stats.total_seconds, 5400);
        assert_eq!(stats.today.entries, 2);
        assert_eq!(stats.today.minutes, 90);
        assert_eq!(stats.today.hours, 1.5);
    }

    #[test]
    fn sub_minute_seconds_are_not_lost_across_entries() {
        // Two 90-second entries are three minutes, not two.
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let entries = vec![
            closed_entry(Utc.with_ymd_and_hms(2025, 6, 18, 8, 0, 0).unwrap(), 90),
            closed_entry(Utc.with_ymd_and_hms(2025, 6, 18, 10, 0, 0).unwrap(), 90),
        ];

        let stats = aggregate_company(&entries, now, utc_offset());
        assert_eq!(stats.today.entries, 2);
        assert_eq!(stats.today.minutes, 3);
        assert_eq!(stats.today.hours, 180.0 / 3600.0);
    }

    #[tokio::test]
    async fn reporting_today_follows_the_injected_clock() {
        use crate::services::clock::FixedClock;

        // 23:30 UTC on the 17th is already the 18th at UTC+2.
        let pool = sqlx::PgPool::connect_lazy("postgres://localhost/punchclock").unwrap();
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2025, 6, 17, 23, 30, 0).unwrap(),
        ));
        let service = TimeEntryService::new(
            TimeEntryRepository::new(pool.clone()),
            UserRepository::new(pool.clone()),
            CompanyRepository::new(pool),
            clock,
            FixedOffset::east_opt(2 * 3600).unwrap(),
        );

        assert_eq!(
            service.reporting_today(),
            NaiveDate::from_ymd_opt(2025, 6, 18).unwrap()
        );
    }
}
