// SPDX-License-Identifier: MIT

//! Notification filters (spec §4.8 "Filters"): keyword/category/priority
//! matching with an ordered Block/Allow short-circuit.

use mcpweaver_core::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    Contains,
    Equals,
    StartsWith,
    EndsWith,
    Regex,
}

/// `Modify`, `ChangeType`, and `Delay` are recognised but treated as no-ops
/// here (spec §9 open question); only `Block` and `Allow` affect delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterAction {
    Block,
    Allow,
    Modify,
    ChangeType,
    Delay,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NotificationFilter {
    pub id: String,
    pub enabled: bool,
    pub condition: FilterCondition,
    pub action: FilterAction,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
}

impl NotificationFilter {
    fn matches_text(&self, haystack: &str) -> bool {
        let haystack_lower = haystack.to_lowercase();
        self.keywords.iter().any(|kw| {
            let kw_lower = kw.to_lowercase();
            match self.condition {
                FilterCondition::Contains => haystack_lower.contains(&kw_lower),
                FilterCondition::Equals => haystack_lower == kw_lower,
                FilterCondition::StartsWith => haystack_lower.starts_with(&kw_lower),
                FilterCondition::EndsWith => haystack_lower.ends_with(&kw_lower),
                FilterCondition::Regex => regex::RegexBuilder::new(kw)
                    .case_insensitive(true)
                    .build()
                    .is_ok_and(|re| re.is_match(haystack)),
            }
        })
    }

    /// A filter matches if any keyword matches title or message under its
    /// condition, or its category/priority equals the candidate's.
    pub fn matches(&self, title: &str, message: &str, category: &str, priority: Priority) -> bool {
        if !self.keywords.is_empty() && (self.matches_text(title) || self.matches_text(message)) {
            return true;
        }
        if let Some(cat) = &self.category {
            if cat.eq_ignore_ascii_case(category) {
                return true;
            }
        }
        if let Some(pri) = self.priority {
            if pri == priority {
                return true;
            }
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Allow,
    Block,
}

/// Iterates enabled filters in order; the first match with action Block
/// blocks, the first match with action Allow short-circuits to allow.
/// Default when nothing matches: allow.
pub fn evaluate(filters: &[NotificationFilter], title: &str, message: &str, category: &str, priority: Priority) -> FilterOutcome {
    for filter in filters.iter().filter(|f| f.enabled) {
        if !filter.matches(title, message, category, priority) {
            continue;
        }
        match filter.action {
            FilterAction::Block => return FilterOutcome::Block,
            FilterAction::Allow => return FilterOutcome::Allow,
            FilterAction::Modify | FilterAction::ChangeType | FilterAction::Delay => continue,
        }
    }
    FilterOutcome::Allow
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
