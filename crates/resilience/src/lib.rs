// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mcpweaver-resilience: reusable resilience primitives consumed by the
//! update and notification services — retry with backoff, circuit breaker,
//! bulkhead (spec §4.1–§4.3).

pub mod bulkhead;
pub mod circuit_breaker;
pub mod retry;

pub use bulkhead::Bulkhead;
pub use circuit_breaker::CircuitBreaker;
pub use retry::{retry, RetryPolicy, RetryResult};
