use super::*;
use mcpweaver_core::FakeClock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap())
}

#[test]
fn immediate_fires_now() {
    let now = dt(2026, 1, 1, 10, 0);
    assert_eq!(next_run(&Schedule::Immediate, now).unwrap(), Some(now));
}

#[test]
fn manual_never_fires() {
    let now = dt(2026, 1, 1, 10, 0);
    assert_eq!(next_run(&Schedule::Manual, now).unwrap(), None);
}

#[test]
fn daily_rolls_to_tomorrow_when_time_passed() {
    let now = dt(2026, 1, 1, 10, 0);
    let next = next_run(&Schedule::Daily { time: "09:00".to_string() }, now).unwrap().unwrap();
    assert_eq!(next, dt(2026, 1, 2, 9, 0));
}

#[test]
fn daily_stays_today_when_time_still_ahead() {
    let now = dt(2026, 1, 1, 8, 0);
    let next = next_run(&Schedule::Daily { time: "09:00".to_string() }, now).unwrap().unwrap();
    assert_eq!(next, dt(2026, 1, 1, 9, 0));
}

/// §8 boundary: weekly with today matching day-of-week and time already
/// past fires 7 days later.
#[test]
fn weekly_today_but_time_passed_fires_next_week() {
    // 2026-01-01 is a Thursday (weekday index 4).
    let now = dt(2026, 1, 1, 10, 0);
    let next = next_run(&Schedule::Weekly { time: "09:00".to_string(), day_of_week: 4 }, now).unwrap().unwrap();
    assert_eq!(next, dt(2026, 1, 8, 9, 0));
}

#[test]
fn weekly_soonest_future_day() {
    let now = dt(2026, 1, 1, 10, 0); // Thursday
    let next = next_run(&Schedule::Weekly { time: "09:00".to_string(), day_of_week: 0 }, now).unwrap().unwrap(); // next Sunday
    assert_eq!(next, dt(2026, 1, 4, 9, 0));
}

/// §8 boundary: monthly on day 31 in February fires on Feb 28 (non-leap).
#[test]
fn monthly_day_31_in_february_clamps_to_28() {
    let now = dt(2026, 1, 20, 10, 0);
    let next = next_run(&Schedule::Monthly { time: "09:00".to_string(), day_of_month: 31 }, now).unwrap().unwrap();
    assert_eq!(next, dt(2026, 2, 28, 9, 0));
}

#[test]
fn monthly_day_31_in_leap_february_clamps_to_29() {
    let now = dt(2028, 1, 20, 10, 0);
    let next = next_run(&Schedule::Monthly { time: "09:00".to_string(), day_of_month: 31 }, now).unwrap().unwrap();
    assert_eq!(next, dt(2028, 2, 29, 9, 0));
}

#[test]
fn monthly_rolls_to_next_month_when_day_passed() {
    let now = dt(2026, 1, 20, 10, 0);
    let next = next_run(&Schedule::Monthly { time: "09:00".to_string(), day_of_month: 5 }, now).unwrap().unwrap();
    assert_eq!(next, dt(2026, 2, 5, 9, 0));
}

#[tokio::test]
async fn immediate_job_fires_once_and_completes() {
    let scheduler = Scheduler::new(FakeClock::new());
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    scheduler
        .schedule_job(JobType::Check, Schedule::Immediate, None, move |_jt| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let job = scheduler.current_job().unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.run_count, 1);
}

#[tokio::test]
async fn scheduling_a_new_job_cancels_the_prior_one() {
    let scheduler = Scheduler::new(FakeClock::new());
    let calls = Arc::new(AtomicU32::new(0));
    let c1 = calls.clone();
    scheduler
        .schedule_job(JobType::Check, Schedule::Daily { time: "23:59".to_string() }, None, move |_jt| {
            let c1 = c1.clone();
            async move {
                c1.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .unwrap();

    let c2 = calls.clone();
    scheduler
        .schedule_job(JobType::Check, Schedule::Immediate, None, move |_jt| {
            let c2 = c2.clone();
            async move {
                c2.fetch_add(10, Ordering::SeqCst);
                Ok(())
            }
        })
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn cancel_stops_the_job() {
    let scheduler = Scheduler::new(FakeClock::new());
    scheduler.schedule_job(JobType::Check, Schedule::Daily { time: "23:59".to_string() }, None, |_jt| async { Ok(()) }).unwrap();
    scheduler.cancel();
    assert!(scheduler.current_job().is_none());
}

#[tokio::test]
async fn pause_marks_job_paused() {
    let scheduler = Scheduler::new(FakeClock::new());
    scheduler.schedule_job(JobType::Check, Schedule::Daily { time: "23:59".to_string() }, None, |_jt| async { Ok(()) }).unwrap();
    scheduler.pause();
    let job = scheduler.current_job().unwrap();
    assert_eq!(job.status, JobStatus::Paused);
}

#[tokio::test]
async fn failed_callback_marks_job_failed() {
    let scheduler = Scheduler::new(FakeClock::new());
    scheduler
        .schedule_job(JobType::Check, Schedule::Immediate, None, |_jt| async {
            Err(AppError::network("boom", "network error"))
        })
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let job = scheduler.current_job().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
}
