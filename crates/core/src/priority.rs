// SPDX-License-Identifier: MIT

//! Notification priority and urgency, ordered `Low < Medium < High < Critical`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// System-notification urgency, as distinct from [`Priority`] because the
/// platform surface (desktop notification centers) speaks this vocabulary.
/// Mapped 1:1 onto `Priority` for gating purposes (spec §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Normal,
    High,
    Critical,
}

impl Urgency {
    pub fn to_priority(self) -> Priority {
        match self {
            Urgency::Low => Priority::Low,
            Urgency::Normal => Priority::Medium,
            Urgency::High => Priority::High,
            Urgency::Critical => Priority::Critical,
        }
    }
}

#[cfg(test)]
#[path = "priority_tests.rs"]
mod tests;
