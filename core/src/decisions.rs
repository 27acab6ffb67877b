//! Decisions follow the 1:3:1 convention: one problem, a short list of options,
//! one recommended option. The recommendation is an index into `options` and
//! must always point at an existing option.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{FieldIssue, Validate, require_non_empty, require_optional_non_empty};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DecisionOption {
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,
    pub user_id: String,
    pub agent_id: Option<String>,
    /// Denormalized so the decision still renders after its agent is deleted
    pub agent_name: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub decision_type: String,
    pub priority: String,
    pub options: Vec<DecisionOption>,
    /// Index into `options`
    pub recommendation: i32,
    pub status: String,
    /// Index into `options` picked on approval
    pub chosen_option: Option<i32>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Decision {
    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }

    /// Checks that `recommendation` and `chosenOption` index into `options`.
    /// Used after a patch is merged, since either side may have changed.
    pub fn option_issues(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        check_options(&mut issues, &self.options);
        check_index(&mut issues, "recommendation", self.recommendation, self.options.len());
        if let Some(chosen) = self.chosen_option {
            check_index(&mut issues, "chosenOption", chosen, self.options.len());
        }
        issues
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDecision {
    #[serde(default)]
    pub agent_id: Option<String>,
    pub agent_name: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub decision_type: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    pub options: Vec<DecisionOption>,
    pub recommendation: i32,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_priority() -> String {
    "medium".to_string()
}

fn default_status() -> String {
    STATUS_PENDING.to_string()
}

impl NewDecision {
    pub fn into_decision(self, id: String, user_id: String, created_at: DateTime<Utc>) -> Decision {
        Decision {
            id,
            user_id,
            agent_id: self.agent_id,
            agent_name: self.agent_name,
            title: self.title,
            description: self.description,
            decision_type: self.decision_type,
            priority: self.priority,
            options: self.options,
            recommendation: self.recommendation,
            status: self.status,
            chosen_option: None,
            resolved_at: None,
            created_at,
        }
    }
}

fn check_options(issues: &mut Vec<FieldIssue>, options: &[DecisionOption]) {
    if options.is_empty() {
        issues.push(FieldIssue::new("options", "options must contain at least one entry"));
    }
    for (position, option) in options.iter().enumerate() {
        if option.label.trim().is_empty() {
            issues.push(FieldIssue::new(
                format!("options[{position}].label"),
                "option label must not be empty",
            ));
        }
    }
}

pub fn check_index(issues: &mut Vec<FieldIssue>, field: &str, index: i32, len: usize) {
    let in_range = usize::try_from(index).map(|i| i < len).unwrap_or(false);
    if !in_range && len > 0 {
        issues.push(FieldIssue::new(
            field,
            format!("{field} must be an index between 0 and {}", len - 1),
        ));
    }
}

impl Validate for NewDecision {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "agentName", &self.agent_name);
        require_non_empty(&mut issues, "title", &self.title);
        require_non_empty(&mut issues, "type", &self.decision_type);
        check_options(&mut issues, &self.options);
        check_index(&mut issues, "recommendation", self.recommendation, self.options.len());
        issues
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DecisionPatch {
    pub agent_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub decision_type: Option<String>,
    pub priority: Option<String>,
    pub options: Option<Vec<DecisionOption>>,
    pub recommendation: Option<i32>,
    pub status: Option<String>,
}

impl DecisionPatch {
    pub fn is_empty(&self) -> bool {
        self.agent_name.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.decision_type.is_none()
            && self.priority.is_none()
            && self.options.is_none()
            && self.recommendation.is_none()
            && self.status.is_none()
    }

    /// True when the patch touches fields that are frozen once a decision
    /// has been approved or rejected.
    pub fn touches_resolution(&self) -> bool {
        self.options.is_some() || self.recommendation.is_some() || self.status.is_some()
    }

    pub fn apply(self, decision: &mut Decision) {
        if let Some(agent_name) = self.agent_name {
            decision.agent_name = agent_name;
        }
        if let Some(title) = self.title {
            decision.title = title;
        }
        if let Some(description) = self.description {
            decision.description = description;
        }
        if let Some(decision_type) = self.decision_type {
            decision.decision_type = decision_type;
        }
        if let Some(priority) = self.priority {
            decision.priority = priority;
        }
        if let Some(options) = self.options {
            decision.options = options;
        }
        if let Some(recommendation) = self.recommendation {
            decision.recommendation = recommendation;
        }
        if let Some(status) = self.status {
            decision.status = status;
        }
    }
}

impl Validate for DecisionPatch {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_optional_non_empty(&mut issues, "agentName", self.agent_name.as_deref());
        require_optional_non_empty(&mut issues, "title", self.title.as_deref());
        require_optional_non_empty(&mut issues, "type", self.decision_type.as_deref());
        require_optional_non_empty(&mut issues, "status", self.status.as_deref());
        if let Some(options) = &self.options {
            check_options(&mut issues, options);
        }
        issues
    }
}

/// Body of `POST /api/decisions/{id}/approve`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApproveDecision {
    /// Defaults to the recommendation
    #[serde(default)]
    pub option_index: Option<i32>,
}

/// Terminal state written when a pending decision is approved or rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionResolution {
    pub status: String,
    pub chosen_option: Option<i32>,
    pub resolved_at: DateTime<Utc>,
}

impl DecisionResolution {
    /// Resolve `decision` as approved. Fails with the offending field when the
    /// chosen option does not exist.
    pub fn approve(
        decision: &Decision,
        option_index: Option<i32>,
        resolved_at: DateTime<Utc>,
    ) -> Result<Self, FieldIssue> {
        let chosen = option_index.unwrap_or(decision.recommendation);
        let mut issues = Vec::new();
        check_index(&mut issues, "optionIndex", chosen, decision.options.len());
        if let Some(issue) = issues.into_iter().next() {
            return Err(issue);
        }
        Ok(Self {
            status: STATUS_APPROVED.to_string(),
            chosen_option: Some(chosen),
            resolved_at,
        })
    }

    pub fn reject(resolved_at: DateTime<Utc>) -> Self {
        Self {
            status: STATUS_REJECTED.to_string(),
            chosen_option: None,
            resolved_at,
        }
    }

    pub fn apply(&self, decision: &mut Decision) {
        decision.status = self.status.clone();
        decision.chosen_option = self.chosen_option;
        decision.resolved_at = Some(self.resolved_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Decision {
        serde_json::from_value::<NewDecision>(json!({
            "agentName": "Closer",
            "title": "Discount request from Acme",
            "description": "Acme asks for 20% off the annual plan",
            "type": "pricing",
            "options": [
                {"label": "Accept", "description": "Give the full 20%"},
                {"label": "Counter", "description": "Offer 10% with a 2-year term"},
                {"label": "Decline", "description": "Hold list price"}
            ],
            "recommendation": 1
        }))
        .expect("decision should deserialize")
        .into_decision("d1".into(), "u1".into(), Utc::now())
    }

    #[test]
    fn wire_format_uses_type_key() {
        let value = serde_json::to_value(sample()).expect("decision serializes");
        assert_eq!(value["type"], "pricing");
        assert_eq!(value["agentName"], "Closer");
        assert_eq!(value["options"].as_array().map(Vec::len), Some(3));
        assert!(value.get("decisionType").is_none());
    }

    #[test]
    fn recommendation_must_index_an_option() {
        let new: NewDecision = serde_json::from_value(json!({
            "agentName": "Closer",
            "title": "t",
            "description": "d",
            "type": "pricing",
            "options": [{"label": "Only", "description": ""}],
            "recommendation": 3
        }))
        .expect("decision should deserialize");
        let issues = new.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "recommendation");
    }

    #[test]
    fn merged_patch_can_break_the_recommendation() {
        let mut decision = sample();
        DecisionPatch {
            options: Some(vec![DecisionOption {
                label: "Accept".into(),
                description: String::new(),
            }]),
            ..Default::default()
        }
        .apply(&mut decision);
        let issues = decision.option_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "recommendation");
    }

    #[test]
    fn shrinking_options_past_the_chosen_one_is_flagged() {
        let mut decision = sample();
        DecisionResolution::approve(&decision, Some(2), Utc::now())
            .expect("valid approval")
            .apply(&mut decision);
        DecisionPatch {
            options: Some(vec![DecisionOption {
                label: "Only".into(),
                description: String::new(),
            }]),
            recommendation: Some(0),
            ..Default::default()
        }
        .apply(&mut decision);
        let fields: Vec<_> = decision.option_issues().into_iter().map(|i| i.field).collect();
        assert_eq!(fields, vec!["chosenOption".to_string()]);
    }

    #[test]
    fn resolution_fields_are_detected_in_patches() {
        let cosmetic = DecisionPatch {
            title: Some("Renamed".into()),
            priority: Some("high".into()),
            ..Default::default()
        };
        assert!(!cosmetic.touches_resolution());
        let reopen = DecisionPatch {
            status: Some(STATUS_PENDING.into()),
            ..Default::default()
        };
        assert!(reopen.touches_resolution());
    }

    #[test]
    fn approval_defaults_to_recommendation() {
        let decision = sample();
        let resolution =
            DecisionResolution::approve(&decision, None, Utc::now()).expect("valid approval");
        assert_eq!(resolution.chosen_option, Some(1));
        assert_eq!(resolution.status, STATUS_APPROVED);

        let err = DecisionResolution::approve(&decision, Some(7), Utc::now())
            .expect_err("out of range option");
        assert_eq!(err.field, "optionIndex");
    }
}
