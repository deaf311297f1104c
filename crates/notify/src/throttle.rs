// SPDX-License-Identifier: MIT

//! Per-key throttle tracker (spec §4.8 "Throttle"): rolling counts over the
//! last minute and hour, keyed by (global, per-category, per-priority).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use mcpweaver_core::Priority;

const ONE_MINUTE: Duration = Duration::from_secs(60);
const ONE_HOUR: Duration = Duration::from_secs(3600);

/// A configured throttling rule for one key.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThrottleRule {
    pub max_per_minute: Option<u32>,
    pub max_per_hour: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ThrottleConfig {
    pub global: ThrottleRule,
    pub per_category: HashMap<String, ThrottleRule>,
    pub per_priority: HashMap<Priority, ThrottleRule>,
}

impl ThrottleConfig {
    pub fn with_global(mut self, rule: ThrottleRule) -> Self {
        self.global = rule;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>, rule: ThrottleRule) -> Self {
        self.per_category.insert(category.into(), rule);
        self
    }

    pub fn with_priority(mut self, priority: Priority, rule: ThrottleRule) -> Self {
        self.per_priority.insert(priority, rule);
        self
    }
}

/// Ring of timestamps per key, truncated to the last hour on every track
/// (spec §3 "ThrottleWindow", §4.8 "Throttle").
#[derive(Debug, Default)]
pub struct ThrottleTracker {
    windows: HashMap<String, Vec<Instant>>,
}

impl ThrottleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if delivering a notification in `category`/`priority` right now
    /// would exceed any configured rule.
    pub fn is_throttled(&self, config: &ThrottleConfig, category: &str, priority: Priority, now: Instant) -> bool {
        self.check_rule(&config.global, "global", now)
            || config.per_category.get(category).is_some_and(|rule| self.check_rule(rule, &format!("cat:{category}"), now))
            || config.per_priority.get(&priority).is_some_and(|rule| self.check_rule(rule, &format!("pri:{priority:?}"), now))
    }

    fn check_rule(&self, rule: &ThrottleRule, key: &str, now: Instant) -> bool {
        let Some(window) = self.windows.get(key) else { return false };
        if let Some(max_minute) = rule.max_per_minute {
            let count = window.iter().filter(|t| now.duration_since(**t) < ONE_MINUTE).count();
            if count as u32 >= max_minute {
                return true;
            }
        }
        if let Some(max_hour) = rule.max_per_hour {
            let count = window.iter().filter(|t| now.duration_since(**t) < ONE_HOUR).count();
            if count as u32 >= max_hour {
                return true;
            }
        }
        false
    }

    /// Record a delivery at `now` for `category`/`priority` and the global
    /// key, purging entries older than an hour opportunistically.
    pub fn track(&mut self, category: &str, priority: Priority, now: Instant) {
        for key in ["global".to_string(), format!("cat:{category}"), format!("pri:{priority:?}")] {
            let window = self.windows.entry(key).or_default();
            window.retain(|t| now.duration_since(*t) < ONE_HOUR);
            window.push(now);
        }
    }
}

#[cfg(test)]
#[path = "throttle_tests.rs"]
mod tests;
