// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mcpweaver-update: Rollback Manager (C5), Update Scheduler (C6), and
//! Update Service (C7) — checks a release feed, downloads with progress,
//! verifies by checksum, atomically swaps an executable, and can roll
//! back from versioned backups (spec §4.5–§4.7).

pub mod models;
pub mod release_feed;
pub mod rollback;
pub mod scheduler;
pub mod service;
pub mod versioning;

pub use models::{
    BackupRecord, ReleaseAsset, ReleaseFeedResponse, RollbackInfo, UpdateAnalyticsEvent, UpdateInfo, UpdateProgress,
    UpdateSettings, UpdateStatus, VerificationMode,
};
pub use release_feed::{Download, ReleaseFeedClient};
pub use rollback::{RollbackManager, ValidationResult};
pub use scheduler::{JobStatus, JobType, Schedule, ScheduledJob, ScheduledJobId, Scheduler};
pub use service::UpdateService;
