//! `FanOutEventSink` wired across the Activity Log and Notification
//! services: a single sink instance shared by two subsystems, each
//! subscriber observing both streams (spec §6 "Event sink").

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mcpweaver_activity_log::{ActivityLogConfig, ActivityLogService, NewLogEntry};
use mcpweaver_adapters::FanOutEventSink;
use mcpweaver_core::FakeClock;
use mcpweaver_notify::ui_bridge::fake::FakeUiBridge;
use mcpweaver_notify::{NewToast, NotificationConfig, NotificationService};

#[test]
fn one_sink_fans_events_out_from_both_subsystems() {
    let sink = FanOutEventSink::new();
    let log_events = Arc::new(AtomicUsize::new(0));
    let notify_events = Arc::new(AtomicUsize::new(0));

    let (log_counter, notify_counter) = (log_events.clone(), notify_events.clone());
    sink.subscribe(move |name, _payload| {
        if name.starts_with("log:") {
            log_counter.fetch_add(1, Ordering::SeqCst);
        } else if name.starts_with("notification:") {
            notify_counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let log = ActivityLogService::new(FakeClock::new(), sink.clone(), ActivityLogConfig::default());
    let notify = NotificationService::new(FakeClock::new(), sink, FakeUiBridge::new(), NotificationConfig::default());

    log.append(NewLogEntry::new("component", "operation", "something happened"));
    notify.show_toast(NewToast::new("Title", "Message")).expect("toast delivers");

    assert_eq!(log_events.load(Ordering::SeqCst), 1);
    assert_eq!(notify_events.load(Ordering::SeqCst), 1);
}

/// A subscriber that panics on one subsystem's events doesn't prevent the
/// other subsystem's events from reaching a second, well-behaved
/// subscriber registered on the same sink.
#[test]
fn a_panicking_subscriber_does_not_starve_a_sibling_subsystem() {
    let sink = FanOutEventSink::new();
    let survived = Arc::new(AtomicUsize::new(0));
    let survived2 = survived.clone();

    sink.subscribe(|name, _payload| {
        if name.starts_with("log:") {
            panic!("a broken UI bridge for the activity log stream");
        }
    });
    sink.subscribe(move |_name, _payload| {
        survived2.fetch_add(1, Ordering::SeqCst);
    });

    let log = ActivityLogService::new(FakeClock::new(), sink, ActivityLogConfig::default());
    log.append(NewLogEntry::new("component", "operation", "still logged"));

    assert_eq!(survived.load(Ordering::SeqCst), 1);
    assert_eq!(log.snapshot().len(), 1);
}
