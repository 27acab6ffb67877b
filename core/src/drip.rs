//! The DRIP matrix: every task is Delegate, Replace, Invest or Produce.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DripCategory {
    Delegate,
    Replace,
    Invest,
    Produce,
}

impl DripCategory {
    pub const ALL: [DripCategory; 4] = [
        DripCategory::Delegate,
        DripCategory::Replace,
        DripCategory::Invest,
        DripCategory::Produce,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DripCategory::Delegate => "delegate",
            DripCategory::Replace => "replace",
            DripCategory::Invest => "invest",
            DripCategory::Produce => "produce",
        }
    }
}

impl fmt::Display for DripCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown DRIP category '{0}', expected one of delegate, replace, invest, produce")]
pub struct UnknownDripCategory(pub String);

impl FromStr for DripCategory {
    type Err = UnknownDripCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delegate" => Ok(DripCategory::Delegate),
            "replace" => Ok(DripCategory::Replace),
            "invest" => Ok(DripCategory::Invest),
            "produce" => Ok(DripCategory::Produce),
            other => Err(UnknownDripCategory(other.to_string())),
        }
    }
}

/// Result of classifying a free-text task description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DripAnalysis {
    pub category: DripCategory,
    pub explanation: String,
    pub recommendation: String,
}

const REPLACE_KEYWORDS: &[&str] = &["email", "inbox", "schedule"];
const DELEGATE_KEYWORDS: &[&str] = &["research", "data entry"];
const PRODUCE_KEYWORDS: &[&str] = &["strategy", "sales call", "client"];

/// Classify a task by keyword. Buckets are checked in a fixed order, so
/// "reply to client email" is Replace even though "client" suggests Produce.
pub fn classify_task(task_description: &str) -> DripCategory {
    let lowered = task_description.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    if matches(REPLACE_KEYWORDS) {
        DripCategory::Replace
    } else if matches(DELEGATE_KEYWORDS) {
        DripCategory::Delegate
    } else if matches(PRODUCE_KEYWORDS) {
        DripCategory::Produce
    } else {
        DripCategory::Invest
    }
}

pub fn analyze_drip(task_description: &str) -> DripAnalysis {
    let category = classify_task(task_description);
    let (explanation, recommendation) = match category {
        DripCategory::Replace => (
            "This is a Time Assassin: repetitive, low-value work that drains attention.",
            "Replace it with an automation agent such as Inbox Sentinel.",
        ),
        DripCategory::Delegate => (
            "This task creates value but does not need your personal judgment.",
            "Delegate it to a team member or a research agent.",
        ),
        DripCategory::Produce => (
            "This is high-value work that only you can do well.",
            "Protect time on your calendar and keep producing.",
        ),
        DripCategory::Invest => (
            "This work compounds over time and builds future leverage.",
            "Invest deliberately: document it and decide who owns it next.",
        ),
    };
    DripAnalysis {
        category,
        explanation: explanation.to_string(),
        recommendation: recommendation.to_string(),
    }
}
