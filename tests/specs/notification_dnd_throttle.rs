//! Notification Service: throttled queueing and DND with allowUrgent.

use mcpweaver_core::{FakeClock, Priority};
use mcpweaver_notify::{
    DndSchedule, NewToast, NotificationConfig, NotificationService, ThrottleConfig, ThrottleRule, ToastOutcome,
};
use mcpweaver_notify::ui_bridge::fake::FakeUiBridge;

type Service = NotificationService<FakeClock, mcpweaver_core::event_sink::fake::FakeEventSink, FakeUiBridge>;

fn service(config: NotificationConfig) -> (Service, FakeClock) {
    let clock = FakeClock::new();
    let sink = mcpweaver_core::event_sink::fake::FakeEventSink::new();
    let ui = FakeUiBridge::new();
    (NotificationService::new(clock.clone(), sink, ui, config), clock)
}

/// Scenario 3: MaxPerMinute=1 for category "error". Two identical Error
/// toasts back-to-back: first delivered, second queued; active count 1.
#[test]
fn throttled_second_toast_in_category_is_queued() {
    let throttle = ThrottleConfig::default().with_category("error", ThrottleRule { max_per_minute: Some(1), max_per_hour: None });
    let config = NotificationConfig::default().throttle(throttle);
    let (notify, _clock) = service(config);

    let new_toast = || NewToast::new("Error", "something broke").category("error").priority(Priority::High);

    let first = notify.show_toast(new_toast()).expect("first toast delivers");
    assert!(matches!(first, ToastOutcome::Delivered(_)));

    let second = notify.show_toast(new_toast()).expect("second toast is gated, not rejected");
    assert!(matches!(second, ToastOutcome::Queued(_)));

    assert_eq!(notify.get_active_toasts().len(), 1);
}

fn always_on_dnd(allow_urgent: bool) -> DndSchedule {
    // An all-week, all-day window with no exceptions: always "in window"
    // whenever the schedule itself is enabled, regardless of wall-clock
    // time — keeps the scenario independent of FakeClock's epoch.
    DndSchedule {
        enabled: true,
        start_time: "00:00".to_string(),
        end_time: "23:59".to_string(),
        days: Vec::new(),
        exceptions: Vec::new(),
        allow_urgent,
    }
}

/// Scenario 4: DND on, schedule covers now, allowUrgent=true. A Medium
/// toast is queued (no active); a Critical toast is delivered (active
/// count becomes 1).
#[test]
fn dnd_defers_medium_but_lets_critical_through_with_allow_urgent() {
    let config = NotificationConfig::default().dnd_mode(true).dnd_schedule(Some(always_on_dnd(true)));
    let (notify, _clock) = service(config);

    let medium = notify.show_toast(NewToast::new("Heads up", "fyi").priority(Priority::Medium)).expect("gated, not rejected");
    assert!(matches!(medium, ToastOutcome::Queued(_)));
    assert_eq!(notify.get_active_toasts().len(), 0);

    let critical =
        notify.show_toast(NewToast::new("Fire", "evacuate").priority(Priority::Critical)).expect("urgent bypasses dnd");
    assert!(matches!(critical, ToastOutcome::Delivered(_)));
    assert_eq!(notify.get_active_toasts().len(), 1);
}

/// Without `allowUrgent`, DND defers every priority uniformly.
#[test]
fn dnd_without_allow_urgent_defers_critical_too() {
    let config = NotificationConfig::default().dnd_mode(true).dnd_schedule(Some(always_on_dnd(false)));
    let (notify, _clock) = service(config);

    let critical = notify.show_toast(NewToast::new("Fire", "evacuate").priority(Priority::Critical)).expect("gated, not rejected");
    assert!(matches!(critical, ToastOutcome::Queued(_)));
    assert_eq!(notify.get_active_toasts().len(), 0);
}
