// SPDX-License-Identifier: MIT

//! Do Not Disturb gating (spec §4.8 "DND").

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};
use mcpweaver_core::Priority;

/// Per-day window plus date exceptions. Day indices follow `chrono`'s
/// `Weekday::num_days_from_sunday()` (Sunday = 0), matching the scheduler's
/// weekly-schedule convention.
#[derive(Debug, Clone, Default)]
pub struct DndSchedule {
    pub enabled: bool,
    pub start_time: String,
    pub end_time: String,
    pub days: Vec<u8>,
    pub exceptions: Vec<NaiveDate>,
    pub allow_urgent: bool,
}

fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    let (h, m) = s.split_once(':')?;
    NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0)
}

impl DndSchedule {
    fn in_window(&self, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        if self.exceptions.contains(&today) {
            return false;
        }
        let weekday = now.weekday().num_days_from_sunday() as u8;
        if !self.days.is_empty() && !self.days.contains(&weekday) {
            return false;
        }
        let (Some(start), Some(end)) = (parse_hhmm(&self.start_time), parse_hhmm(&self.end_time)) else {
            return false;
        };
        let now_time = NaiveTime::from_hms_opt(now.hour(), now.minute(), now.second()).unwrap_or(start);
        if end < start {
            // Window spans midnight: active from start..24:00 and 00:00..end.
            now_time >= start || now_time < end
        } else {
            now_time >= start && now_time < end
        }
    }
}

/// True if DND currently suppresses immediate delivery of a notification at
/// `priority`.
pub fn is_active(dnd_mode: bool, schedule: Option<&DndSchedule>, now: DateTime<Utc>, priority: Priority) -> bool {
    if !dnd_mode {
        return false;
    }
    let active = match schedule {
        None => true,
        Some(sched) if !sched.enabled => true,
        Some(sched) => sched.in_window(now),
    };
    if !active {
        return false;
    }
    if let Some(sched) = schedule {
        if sched.allow_urgent && priority == Priority::Critical {
            return false;
        }
    }
    true
}

#[cfg(test)]
#[path = "dnd_tests.rs"]
mod tests;
