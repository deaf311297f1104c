//! Notification Service + `InMemoryRowStore`: durable history persists
//! through the adapter and hydrates back into a fresh service instance
//! (spec §4.8 "Durable history", §6 "Row store").

use std::sync::Arc;
use std::time::Duration;

use mcpweaver_adapters::InMemoryRowStore;
use mcpweaver_core::event_sink::fake::FakeEventSink;
use mcpweaver_core::FakeClock;
use mcpweaver_notify::ui_bridge::fake::FakeUiBridge;
use mcpweaver_notify::{NewToast, NotificationConfig, NotificationService};

/// Give the fire-and-forget `tokio::spawn` history writes a chance to run
/// against the in-memory store before asserting on it.
async fn let_spawned_writes_settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn toast_history_survives_into_a_freshly_hydrated_service() {
    let store = Arc::new(InMemoryRowStore::new());
    let clock = FakeClock::new();

    let first =
        NotificationService::new(clock.clone(), FakeEventSink::new(), FakeUiBridge::new(), NotificationConfig::default())
            .with_row_store(store.clone());

    first.show_toast(NewToast::new("Build finished", "all green")).expect("toast delivers");
    let_spawned_writes_settle().await;
    assert_eq!(store.len(), 1);

    // A brand new service instance, same store: hydrate_history should
    // recover the row written by the first instance.
    let second =
        NotificationService::new(clock.clone(), FakeEventSink::new(), FakeUiBridge::new(), NotificationConfig::default())
            .with_row_store(store.clone());
    assert!(second.history(10).is_empty());

    second.hydrate_history().await.expect("hydrate_history");
    let history = second.history(10);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].title, "Build finished");
}

#[tokio::test]
async fn mark_as_read_persists_through_an_update_statement() {
    let store = Arc::new(InMemoryRowStore::new());
    let clock = FakeClock::new();
    let service =
        NotificationService::new(clock, FakeEventSink::new(), FakeUiBridge::new(), NotificationConfig::default())
            .with_row_store(store.clone());

    let outcome = service.show_toast(NewToast::new("Heads up", "check this out")).expect("toast delivers");
    let id = match outcome {
        mcpweaver_notify::ToastOutcome::Delivered(id) => id,
        other => panic!("expected Delivered, got {other:?}"),
    };
    let_spawned_writes_settle().await;

    service.mark_as_read(id.as_str()).expect("mark_as_read");
    let_spawned_writes_settle().await;

    // Idempotent: a second call doesn't error and doesn't restamp readAt.
    service.mark_as_read(id.as_str()).expect("mark_as_read is idempotent");

    let hydrated = NotificationService::new(
        FakeClock::new(),
        FakeEventSink::new(),
        FakeUiBridge::new(),
        NotificationConfig::default(),
    )
    .with_row_store(store);
    hydrated.hydrate_history().await.expect("hydrate_history");
    let record = hydrated.history(10).into_iter().next().expect("one history row");
    assert!(record.read_at.is_some());
}
