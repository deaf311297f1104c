// SPDX-License-Identifier: MIT

//! Fan-out `EventSink` (spec §6 "Event sink"): the UI event bus collaborator
//! this workspace treats as an external concern (spec §1 "UI event bus:
//! fire-and-forget tagged messages"). Mirrors the teacher's
//! `DesktopNotifyAdapter` shape — a small `Clone + Send + Sync` struct
//! wrapping shared state behind a mutex, with named construction and a
//! swallow-everything `emit`.

use std::sync::Arc;

use mcpweaver_core::{EventSink, Metadata};
use parking_lot::Mutex;

/// A single registered subscriber: receives every `(name, payload)` pair
/// emitted through the sink. Held as a boxed closure so the hosting
/// application can bridge into whatever UI transport it uses (Tauri's
/// `emit_all`, a websocket broadcast, …) without this crate depending on
/// any of them.
type Subscriber = Box<dyn Fn(&str, &Metadata) + Send + Sync>;

struct Inner {
    subscribers: Vec<Subscriber>,
}

/// Fan-out `EventSink`: forwards every emitted event to each registered
/// subscriber in registration order, swallowing subscriber panics so one
/// broken bridge can't take down the others (spec §6 "panics are
/// swallowed").
#[derive(Clone)]
pub struct FanOutEventSink {
    inner: Arc<Mutex<Inner>>,
}

impl FanOutEventSink {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(Inner { subscribers: Vec::new() })) }
    }

    /// Register a subscriber. Returns `self` for chained construction at
    /// startup, matching the teacher's builder-style adapter wiring.
    pub fn subscribe(&self, subscriber: impl Fn(&str, &Metadata) + Send + Sync + 'static) {
        self.inner.lock().subscribers.push(Box::new(subscriber));
    }
}

impl Default for FanOutEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for FanOutEventSink {
    fn emit(&self, name: &str, payload: Metadata) {
        tracing::debug!(event = name, "emitting event");
        let subscribers_len = self.inner.lock().subscribers.len();
        for idx in 0..subscribers_len {
            // Re-lock per subscriber rather than holding the lock across the
            // call: a subscriber emitting a further event (e.g. logging its
            // own failure) must not deadlock against this same mutex.
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                let inner = self.inner.lock();
                if let Some(subscriber) = inner.subscribers.get(idx) {
                    subscriber(name, &payload);
                }
            }));
            if result.is_err() {
                tracing::warn!(event = name, subscriber = idx, "event subscriber panicked; swallowed");
            }
        }
    }
}
