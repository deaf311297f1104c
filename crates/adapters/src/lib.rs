// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mcpweaver-adapters: concrete implementations of the external
//! collaborators spec §6 describes — the fan-out event sink, the desktop
//! `UiBridge`, the HTTP release-feed client, and an in-memory `RowStore` —
//! wired up the way a hosting desktop-shell application would construct and
//! inject them into the core subsystems.

pub mod event_sink;
pub mod release_feed;
pub mod row_store;
pub mod ui_bridge;

pub use event_sink::FanOutEventSink;
pub use release_feed::HttpReleaseFeedClient;
pub use row_store::InMemoryRowStore;
pub use ui_bridge::DesktopUiBridge;
