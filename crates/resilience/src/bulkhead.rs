// SPDX-License-Identifier: MIT

//! Bulkhead (C3): limit concurrent entries to a named resource via counting
//! semaphores (spec §4.3).

use mcpweaver_core::AppError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Limits concurrent entries per named resource. Unknown resources bypass
/// (no limit), matching spec §4.3.
#[derive(Default)]
pub struct Bulkhead {
    limits: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Bulkhead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a counting semaphore of capacity `n` for `resource`.
    pub fn set_limit(&self, resource: impl Into<String>, n: usize) {
        self.limits.lock().insert(resource.into(), Arc::new(Semaphore::new(n)));
    }

    /// Acquire a permit for `resource` (or bypass if unconfigured), run `f`,
    /// release on every exit path. Returns a cancellation error if `cancel`
    /// fires before a permit is acquired.
    pub async fn execute<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        resource: &str,
        f: F,
    ) -> Result<T, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let sem = self.limits.lock().get(resource).cloned();
        let Some(sem) = sem else {
            return f().await;
        };

        let _permit = tokio::select! {
            permit = sem.acquire_owned() => permit.map_err(|_| {
                AppError::system("bulkhead.closed", "bulkhead semaphore closed")
            })?,
            _ = cancel.cancelled() => {
                return Err(AppError::system("bulkhead.cancelled", "cancelled while waiting for a bulkhead permit"));
            }
        };

        f().await
    }

    pub fn available_permits(&self, resource: &str) -> Option<usize> {
        self.limits.lock().get(resource).map(|s| s.available_permits())
    }
}

#[cfg(test)]
#[path = "bulkhead_tests.rs"]
mod tests;
