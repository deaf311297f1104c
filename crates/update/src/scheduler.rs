// SPDX-License-Identifier: MIT

//! Update Scheduler (C6, spec §4.6): a single-slot cron-like scheduler
//! driving the Update Service.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveTime, TimeZone, Utc, Weekday};
use mcpweaver_core::{AppError, Clock};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::models::UpdateInfo;

mcpweaver_core::define_hex_id! {
    /// Unique identifier for a scheduled job.
    pub struct ScheduledJobId("sched_", 16);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Check,
    Download,
    Install,
}

/// Recurrence rule (spec §4.6 "next-run rules").
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Schedule {
    Immediate,
    Daily { time: String },
    Weekly { time: String, day_of_week: u32 },
    Monthly { time: String, day_of_month: u32 },
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Active,
    Paused,
    Complete,
    Failed,
    Canceled,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScheduledJob {
    pub id: ScheduledJobId,
    pub job_type: JobType,
    pub schedule: Schedule,
    pub update_info: Option<UpdateInfo>,
    pub created_at: DateTime<Utc>,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub run_count: u32,
    pub status: JobStatus,
    pub error: Option<String>,
}

fn parse_hhmm(time: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::validation("scheduler.bad_time", format!("invalid HH:MM time: {time}")))
}

/// Compute the next fire time for `schedule` relative to `now` (spec §4.6
/// "next-run rules").
pub fn next_run(schedule: &Schedule, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, AppError> {
    match schedule {
        Schedule::Immediate => Ok(Some(now)),
        Schedule::Manual => Ok(None),
        Schedule::Daily { time } => {
            let t = parse_hhmm(time)?;
            let mut candidate = Utc.from_utc_datetime(&now.date_naive().and_time(t));
            if candidate <= now {
                candidate += ChronoDuration::days(1);
            }
            Ok(Some(candidate))
        }
        Schedule::Weekly { time, day_of_week } => {
            let t = parse_hhmm(time)?;
            let target = weekday_from_index(*day_of_week)?;
            let mut candidate = Utc.from_utc_datetime(&now.date_naive().and_time(t));
            let mut days_ahead = (target.num_days_from_monday() as i64 - now.weekday().num_days_from_monday() as i64 + 7) % 7;
            if days_ahead == 0 && candidate <= now {
                days_ahead = 7;
            }
            candidate += ChronoDuration::days(days_ahead);
            Ok(Some(candidate))
        }
        Schedule::Monthly { time, day_of_month } => {
            let t = parse_hhmm(time)?;
            Ok(Some(next_monthly(now, t, *day_of_month)))
        }
    }
}

fn weekday_from_index(day_of_week: u32) -> Result<Weekday, AppError> {
    // spec.md: 0..6, Sunday-first convention (common JS `Date.getDay()`).
    match day_of_week {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(AppError::validation("scheduler.bad_day", format!("day_of_week out of range: {other}"))),
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in a calendar month, computed from a fixed table rather than by
/// round-tripping through `NaiveDate` so no fallible construction is needed.
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 30,
    }
}

/// This month at `day_of_month`/`time` if that instant is still in the
/// future; otherwise next month, clamped to the last day of a short month
/// (spec §4.6, §8 "Monthly schedule on dayOfMonth 31 in February").
fn next_monthly(now: DateTime<Utc>, time: NaiveTime, day_of_month: u32) -> DateTime<Utc> {
    let try_month = |year: i32, month: u32| -> DateTime<Utc> {
        let clamped_day = day_of_month.min(days_in_month(year, month)).max(1);
        // `clamped_day` is always in range for `year`/`month`, so this never
        // fails in practice; fall back to the first of the month rather than
        // panicking if it somehow did.
        let date = chrono::NaiveDate::from_ymd_opt(year, month, clamped_day)
            .or_else(|| chrono::NaiveDate::from_ymd_opt(year, month, 1))
            .unwrap_or_default();
        Utc.from_utc_datetime(&date.and_time(time))
    };

    let this_month = try_month(now.year(), now.month());
    if this_month > now {
        return this_month;
    }
    let (next_year, next_month) = if now.month() == 12 { (now.year() + 1, 1) } else { (now.year(), now.month() + 1) };
    try_month(next_year, next_month)
}

struct Armed {
    job: ScheduledJob,
    handle: tokio::task::JoinHandle<()>,
    cancel: CancellationToken,
}

/// Single-job scheduler. Scheduling a new job cancels the prior one (spec
/// §4.6, §5 "at most one job at a time").
pub struct Scheduler<C: Clock> {
    clock: C,
    armed: Arc<Mutex<Option<Armed>>>,
}

impl<C: Clock + 'static> Scheduler<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, armed: Arc::new(Mutex::new(None)) }
    }

    pub fn current_job(&self) -> Option<ScheduledJob> {
        self.armed.lock().as_ref().map(|a| a.job.clone())
    }

    /// Cancel any existing job, compute `nextRun`, and arm a timer that
    /// invokes `on_fire` when it fires (spec §4.6 "Execution").
    pub fn schedule_job<F, Fut>(
        &self,
        job_type: JobType,
        schedule: Schedule,
        update_info: Option<UpdateInfo>,
        on_fire: F,
    ) -> Result<ScheduledJob, AppError>
    where
        F: Fn(JobType) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), AppError>> + Send + 'static,
    {
        self.cancel();

        let now = self.clock.now_utc();
        let next = next_run(&schedule, now)?;
        let job = ScheduledJob {
            id: ScheduledJobId::new(),
            job_type,
            schedule: schedule.clone(),
            update_info,
            created_at: now,
            last_run: None,
            next_run: next,
            run_count: 0,
            status: JobStatus::Active,
            error: None,
        };

        self.arm(job.clone(), Arc::new(on_fire));
        Ok(job)
    }

    /// Arm (or re-arm) the single job slot. The spawned task loops
    /// internally across fires so a recurring schedule keeps re-arming
    /// itself without recursing back through `arm` (spec §4.6 "Execution").
    fn arm<F, Fut>(&self, job: ScheduledJob, on_fire: Arc<F>)
    where
        F: Fn(JobType) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), AppError>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let armed = self.armed.clone();
        let clock = self.clock.clone();
        let cancel_for_task = cancel.clone();
        let job_type = job.job_type;
        let mut next = job.next_run;

        let handle = tokio::spawn(async move {
            loop {
                let Some(next_at) = next else { break };
                let wait = (next_at - clock.now_utc()).to_std().unwrap_or(std::time::Duration::ZERO);

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = cancel_for_task.cancelled() => return,
                }

                let result = on_fire(job_type).await;

                let mut guard = armed.lock();
                let Some(current) = guard.as_mut() else { return };
                current.job.last_run = Some(clock.now_utc());
                current.job.run_count += 1;

                if let Err(e) = result {
                    current.job.status = JobStatus::Failed;
                    current.job.error = Some(e.message);
                    return;
                }

                if matches!(current.job.schedule, Schedule::Immediate) {
                    current.job.status = JobStatus::Complete;
                    return;
                }

                match next_run(&current.job.schedule, clock.now_utc()) {
                    Ok(computed) => {
                        current.job.next_run = computed;
                        next = computed;
                    }
                    Err(e) => {
                        current.job.status = JobStatus::Failed;
                        current.job.error = Some(e.message);
                        return;
                    }
                }
                drop(guard);
            }
        });

        *self.armed.lock() = Some(Armed { job, handle, cancel });
    }

    /// Stop the timer and mark the job Paused (spec §4.6 "Pause").
    pub fn pause(&self) {
        let mut guard = self.armed.lock();
        if let Some(armed) = guard.as_mut() {
            armed.cancel.cancel();
            armed.job.status = JobStatus::Paused;
        }
    }

    /// Recompute next run and re-arm (spec §4.6 "Resume"). Requires the
    /// same `on_fire` callback since the scheduler itself is stateless
    /// about it once paused.
    pub fn resume<F, Fut>(&self, on_fire: F) -> Result<(), AppError>
    where
        F: Fn(JobType) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), AppError>> + Send + 'static,
    {
        let job = {
            let mut guard = self.armed.lock();
            let Some(armed) = guard.as_mut() else {
                return Err(AppError::validation("scheduler.no_job", "no job to resume"));
            };
            armed.cancel.cancel();
            let mut job = armed.job.clone();
            job.next_run = next_run(&job.schedule, self.clock.now_utc())?;
            job.status = JobStatus::Active;
            job
        };
        self.arm(job, Arc::new(on_fire));
        Ok(())
    }

    /// Clear both timer and job (spec §4.6 "Cancel").
    pub fn cancel(&self) {
        if let Some(armed) = self.armed.lock().take() {
            armed.cancel.cancel();
            armed.handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
