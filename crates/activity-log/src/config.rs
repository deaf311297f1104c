// SPDX-License-Identifier: MIT

//! Activity log configuration (spec §4.4 "State").

use mcpweaver_core::Level;
use std::time::Duration;

/// Configuration for the activity log service.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ActivityLogConfig {
    /// Minimum level accepted by `append` (spec §4.4 "Append").
    pub level: Level,
    /// Days after which `performMaintenance` prunes entries. `0` disables
    /// the sweep.
    pub retention_days: u32,
    /// Echo a formatted line to stdout on every accepted append.
    pub enable_console: bool,
    /// Interval between maintenance ticks.
    #[serde(with = "humantime_duration")]
    pub flush_interval: Duration,
    /// Fixed circular buffer capacity.
    pub buffer_size: usize,
}

impl Default for ActivityLogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            retention_days: 30,
            enable_console: false,
            flush_interval: Duration::from_secs(60),
            buffer_size: 1000,
        }
    }
}

impl ActivityLogConfig {
    mcpweaver_core::setters! {
        set {
            level: Level,
            retention_days: u32,
            enable_console: bool,
            flush_interval: Duration,
            buffer_size: usize,
        }
    }
}

/// Serializes a `Duration` as whole milliseconds so `ActivityLogConfig`
/// round-trips through TOML/JSON the way the rest of the workspace's
/// config structs do (spec.md's ambient configuration layer, SPEC_FULL §1).
mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}
