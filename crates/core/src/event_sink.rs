// SPDX-License-Identifier: MIT

//! Fire-and-forget event sink (spec §6): the UI event bus collaborator.
//!
//! Mirrors the teacher's desktop-notification adapter pattern (a small
//! async trait, `Clone + Send + Sync`, with a test-only fake) rather than
//! the heavier subscriber-table design spec.md's §9 "Dispatch polymorphism"
//! note explicitly steers away from.

use crate::metadata::Metadata;

/// Fire-and-forget publisher. Implementations must swallow their own
/// errors — `Emit` never fails to the caller.
pub trait EventSink: Clone + Send + Sync + 'static {
    fn emit(&self, name: &str, payload: Metadata);
}

/// An `EventSink` that discards everything. Useful as a default when no
/// host bridge is attached.
#[derive(Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _name: &str, _payload: Metadata) {}
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    pub struct EmittedEvent {
        pub name: String,
        pub payload: Metadata,
    }

    /// Records every emitted event for assertions in tests.
    #[derive(Clone, Default)]
    pub struct FakeEventSink {
        events: Arc<Mutex<Vec<EmittedEvent>>>,
    }

    impl FakeEventSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<EmittedEvent> {
            self.events.lock().clone()
        }

        pub fn names(&self) -> Vec<String> {
            self.events.lock().iter().map(|e| e.name.clone()).collect()
        }

        pub fn count(&self, name: &str) -> usize {
            self.events.lock().iter().filter(|e| e.name == name).count()
        }
    }

    impl EventSink for FakeEventSink {
        fn emit(&self, name: &str, payload: Metadata) {
            self.events.lock().push(EmittedEvent { name: name.to_string(), payload });
        }
    }
}
