use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::drip::{DripCategory, UnknownDripCategory};
use crate::validation::{FieldIssue, Validate, require_non_empty};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    pub user_id: String,
    pub task: String,
    pub category: DripCategory,
    /// Minutes
    pub duration: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeEntry {
    pub task: String,
    /// One of delegate, replace, invest, produce. Kept as text here so a bad
    /// value is reported against this field.
    pub category: String,
    pub duration: i32,
}

impl NewTimeEntry {
    pub fn into_time_entry(
        self,
        id: String,
        user_id: String,
        created_at: DateTime<Utc>,
    ) -> Result<TimeEntry, UnknownDripCategory> {
        Ok(TimeEntry {
            id,
            user_id,
            task: self.task,
            category: self.category.parse()?,
            duration: self.duration,
            created_at,
        })
    }
}

impl Validate for NewTimeEntry {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "task", &self.task);
        if let Err(err) = self.category.parse::<DripCategory>() {
            issues.push(FieldIssue::new("category", err.to_string()));
        }
        if self.duration <= 0 {
            issues.push(FieldIssue::new("duration", "duration must be a positive number of minutes"));
        }
        issues
    }
}

/// Minutes logged per DRIP quadrant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DripSummary {
    pub delegate: i64,
    pub replace: i64,
    pub invest: i64,
    pub produce: i64,
    pub total: i64,
}

impl DripSummary {
    pub fn from_entries(entries: &[TimeEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            let minutes = i64::from(entry.duration);
            match entry.category {
                DripCategory::Delegate => summary.delegate += minutes,
                DripCategory::Replace => summary.replace += minutes,
                DripCategory::Invest => summary.invest += minutes,
                DripCategory::Produce => summary.produce += minutes,
            }
            summary.total += minutes;
        }
        summary
    }
}
