//! Update Scheduler: next-run rules and their calendar boundary cases
//! (spec §4.6 "next-run rules", §8 "Boundary behaviours").

use chrono::{TimeZone, Utc};
use mcpweaver_update::Schedule;

// `next_run` is a free function on the `scheduler` module; it isn't part
// of the crate's public re-export surface, so reach it by path.
use mcpweaver_update::scheduler::next_run as scheduler_next_run;

/// Monthly schedule on dayOfMonth 31 in February fires on Feb 28 (no leap
/// day that year).
#[test]
fn monthly_day_31_in_non_leap_february_clamps_to_the_28th() {
    let now = Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).single().expect("valid datetime");
    let schedule = Schedule::Monthly { time: "09:00".to_string(), day_of_month: 31 };

    let next = scheduler_next_run(&schedule, now).expect("valid schedule").expect("monthly always has a next run");
    assert_eq!(next.date_naive(), Utc.with_ymd_and_hms(2023, 2, 28, 9, 0, 0).single().unwrap().date_naive());
}

/// Same schedule in a leap year clamps to Feb 29 instead.
#[test]
fn monthly_day_31_in_leap_february_clamps_to_the_29th() {
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).single().expect("valid datetime");
    let schedule = Schedule::Monthly { time: "09:00".to_string(), day_of_month: 31 };

    let next = scheduler_next_run(&schedule, now).expect("valid schedule").expect("monthly always has a next run");
    assert_eq!(next.date_naive(), Utc.with_ymd_and_hms(2024, 2, 29, 9, 0, 0).single().unwrap().date_naive());
}

/// Once this month's clamped date has already passed, the schedule rolls
/// over to next month.
#[test]
fn monthly_rolls_over_once_this_months_date_has_passed() {
    let now = Utc.with_ymd_and_hms(2023, 2, 28, 23, 0, 0).single().expect("valid datetime");
    let schedule = Schedule::Monthly { time: "09:00".to_string(), day_of_month: 31 };

    let next = scheduler_next_run(&schedule, now).expect("valid schedule").expect("monthly always has a next run");
    assert_eq!(next.date_naive(), Utc.with_ymd_and_hms(2023, 3, 31, 9, 0, 0).single().unwrap().date_naive());
}

/// Weekly with today matching dayOfWeek and the time already past fires
/// seven days later, not today (spec §8 "Boundary behaviours").
#[test]
fn weekly_on_matching_day_past_the_time_fires_next_week() {
    // 2024-01-03 is a Wednesday; day_of_week uses the Sunday=0 convention
    // so Wednesday is 3.
    let now = Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).single().expect("valid datetime");
    let schedule = Schedule::Weekly { time: "09:00".to_string(), day_of_week: 3 };

    let next = scheduler_next_run(&schedule, now).expect("valid schedule").expect("weekly always has a next run");
    assert_eq!(next.date_naive(), Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).single().unwrap().date_naive());
}

/// Weekly with today matching dayOfWeek and the time still ahead fires
/// later today.
#[test]
fn weekly_on_matching_day_before_the_time_fires_today() {
    let now = Utc.with_ymd_and_hms(2024, 1, 3, 8, 0, 0).single().expect("valid datetime");
    let schedule = Schedule::Weekly { time: "09:00".to_string(), day_of_week: 3 };

    let next = scheduler_next_run(&schedule, now).expect("valid schedule").expect("weekly always has a next run");
    assert_eq!(next.date_naive(), now.date_naive());
}

/// `Manual` never arms a next run.
#[test]
fn manual_schedule_has_no_next_run() {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid datetime");
    let next = scheduler_next_run(&Schedule::Manual, now).expect("manual schedule always parses");
    assert!(next.is_none());
}
