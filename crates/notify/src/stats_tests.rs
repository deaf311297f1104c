use super::*;
use chrono::TimeZone;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 28, hour, 0, 0).unwrap()
}

#[test]
fn fresh_stats_are_all_zero() {
    let stats = NotificationStats::new();
    assert_eq!(stats.total_sent, 0);
    assert!(stats.by_category.is_empty());
}

#[test]
fn record_toast_sent_increments_totals_and_buckets() {
    let mut stats = NotificationStats::new();
    stats.record_toast_sent("general", Priority::Medium, at(9));
    assert_eq!(stats.total_sent, 1);
    assert_eq!(stats.total_toast, 1);
    assert_eq!(stats.total_system, 0);
    assert_eq!(stats.by_category["general"].sent, 1);
    assert_eq!(stats.by_priority[&Priority::Medium].sent, 1);
    assert_eq!(stats.by_hour_of_day[9], 1);
}

#[test]
fn record_system_sent_increments_system_total() {
    let mut stats = NotificationStats::new();
    stats.record_system_sent("general", Priority::High, at(14));
    assert_eq!(stats.total_system, 1);
    assert_eq!(stats.total_sent, 1);
}

/// `stats.TotalSent == |history|` invariant holds as deliveries accumulate.
#[test]
fn total_sent_equals_sum_of_toast_and_system() {
    let mut stats = NotificationStats::new();
    stats.record_toast_sent("a", Priority::Low, at(1));
    stats.record_system_sent("b", Priority::High, at(2));
    stats.record_toast_sent("a", Priority::Low, at(3));
    assert_eq!(stats.total_sent, stats.total_toast + stats.total_system);
    assert_eq!(stats.total_sent, 3);
}

#[test]
fn read_dismissed_interacted_buckets_are_independent_of_sent() {
    let mut stats = NotificationStats::new();
    stats.record_toast_sent("a", Priority::Low, at(1));
    stats.record_read("a", Priority::Low);
    stats.record_dismissed("a", Priority::Low);
    stats.record_interacted("a", Priority::Low);

    let bucket = stats.by_category["a"];
    assert_eq!(bucket.sent, 1);
    assert_eq!(bucket.read, 1);
    assert_eq!(bucket.dismissed, 1);
    assert_eq!(bucket.interacted, 1);
    assert_eq!(stats.total_read, 1);
    assert_eq!(stats.total_dismissed, 1);
    assert_eq!(stats.total_interacted, 1);
}
