use super::*;
use chrono::TimeZone;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    // 2026-07-28 is a Tuesday.
    Utc.with_ymd_and_hms(2026, 7, 28, hour, minute, 0).unwrap()
}

#[test]
fn dnd_off_never_active() {
    assert!(!is_active(false, None, at(10, 0), Priority::Low));
}

#[test]
fn dnd_on_without_schedule_is_always_active() {
    assert!(is_active(true, None, at(3, 0), Priority::Low));
}

#[test]
fn disabled_schedule_means_always_active() {
    let sched = DndSchedule { enabled: false, ..Default::default() };
    assert!(is_active(true, Some(&sched), at(14, 0), Priority::Low));
}

#[test]
fn schedule_window_gates_by_time() {
    let sched = DndSchedule {
        enabled: true,
        start_time: "22:00".to_string(),
        end_time: "07:00".to_string(),
        days: vec![],
        exceptions: vec![],
        allow_urgent: false,
    };
    assert!(is_active(true, Some(&sched), at(23, 0), Priority::Low));
    assert!(is_active(true, Some(&sched), at(6, 0), Priority::Low));
    assert!(!is_active(true, Some(&sched), at(12, 0), Priority::Low));
}

#[test]
fn schedule_restricted_to_specific_days() {
    let sched = DndSchedule {
        enabled: true,
        start_time: "00:00".to_string(),
        end_time: "23:59".to_string(),
        days: vec![1, 2, 3, 4, 5], // Mon-Fri (Sunday = 0)
        exceptions: vec![],
        allow_urgent: false,
    };
    assert!(is_active(true, Some(&sched), at(10, 0), Priority::Low)); // Tuesday
}

#[test]
fn exception_date_disables_window_for_that_day() {
    let sched = DndSchedule {
        enabled: true,
        start_time: "00:00".to_string(),
        end_time: "23:59".to_string(),
        days: vec![],
        exceptions: vec![chrono::NaiveDate::from_ymd_opt(2026, 7, 28).unwrap()],
        allow_urgent: false,
    };
    assert!(!is_active(true, Some(&sched), at(10, 0), Priority::Low));
}

/// Seed scenario 4: DND with allowUrgent bypasses Critical but not Medium.
#[test]
fn allow_urgent_bypasses_only_critical() {
    let sched = DndSchedule {
        enabled: true,
        start_time: "00:00".to_string(),
        end_time: "23:59".to_string(),
        days: vec![],
        exceptions: vec![],
        allow_urgent: true,
    };
    assert!(is_active(true, Some(&sched), at(10, 0), Priority::Medium));
    assert!(!is_active(true, Some(&sched), at(10, 0), Priority::Critical));
}
