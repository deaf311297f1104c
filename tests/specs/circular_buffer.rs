//! Activity Log Service: circular overwrite and level filtering.

use std::time::Duration;

use mcpweaver_activity_log::{ActivityLogConfig, ActivityLogService, LogFilter, NewLogEntry};
use mcpweaver_core::{FakeClock, Level, NullEventSink};

fn service(buffer_size: usize) -> (ActivityLogService<FakeClock, NullEventSink>, FakeClock) {
    let clock = FakeClock::new();
    let config = ActivityLogConfig::default().buffer_size(buffer_size).level(Level::Debug);
    (ActivityLogService::new(clock.clone(), NullEventSink, config), clock)
}

/// Scenario 1: bufferSize=3, insert M0..M4, unfiltered read returns exactly
/// the three newest, newest first.
#[test]
fn circular_overwrite_keeps_only_the_newest_three() {
    let (log, clock) = service(3);
    for msg in ["M0", "M1", "M2", "M3", "M4"] {
        log.append(NewLogEntry::new("test", "op", msg));
        clock.advance(Duration::from_millis(1));
    }

    let entries = log.get_logs(&LogFilter::default());
    let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["M4", "M3", "M2"]);
}

/// Buffer size 1 boundary: every insert overwrites, read returns only the
/// latest (spec §8 "Boundary behaviours").
#[test]
fn buffer_size_one_always_overwrites() {
    let (log, clock) = service(1);
    log.append(NewLogEntry::new("test", "op", "first"));
    clock.advance(Duration::from_millis(1));
    log.append(NewLogEntry::new("test", "op", "second"));

    let entries = log.get_logs(&LogFilter::default());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "second");
}

/// Scenario 2: Info "a", Warn "b", Error "c"; GetLogs({level: Warn}) returns
/// only "b".
#[test]
fn level_filter_returns_only_matching_entries() {
    let (log, clock) = service(10);
    log.append(NewLogEntry::new("test", "op", "a").level(Level::Info));
    clock.advance(Duration::from_millis(1));
    log.append(NewLogEntry::new("test", "op", "b").level(Level::Warn));
    clock.advance(Duration::from_millis(1));
    log.append(NewLogEntry::new("test", "op", "c").level(Level::Error));

    let filter = LogFilter { level: Some(Level::Warn), ..Default::default() };
    let entries = log.get_logs(&filter);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "b");
}

/// Entries below the configured minimum level are rejected at append time,
/// never observable even through an unfiltered read.
#[test]
fn append_below_configured_level_is_dropped() {
    let clock = FakeClock::new();
    let config = ActivityLogConfig::default().buffer_size(10).level(Level::Warn);
    let log = ActivityLogService::new(clock, NullEventSink, config);

    log.append(NewLogEntry::new("test", "op", "too quiet").level(Level::Debug));
    log.append(NewLogEntry::new("test", "op", "loud enough").level(Level::Error));

    let entries = log.get_logs(&LogFilter::default());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "loud enough");
}
