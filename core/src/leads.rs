use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{FieldIssue, Validate, require_non_empty, require_optional_non_empty};

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

/// A prospect collected by a campaign. Leads are owned by their campaign,
/// never directly by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub campaign_id: String,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    /// Free-text revenue band (e.g. "$1M-$5M"), not a number
    pub revenue: Option<String>,
    pub score: i32,
    /// Free-form status such as "VIP" or "Qualified"
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub campaign_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub revenue: Option<String>,
    #[serde(default)]
    pub score: i32,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "New".to_string()
}

impl NewLead {
    pub fn into_lead(self, id: String, created_at: DateTime<Utc>) -> Lead {
        Lead {
            id,
            campaign_id: self.campaign_id,
            name: self.name,
            email: self.email,
            company: self.company,
            revenue: self.revenue,
            score: self.score,
            status: self.status,
            created_at,
        }
    }
}

fn check_score(issues: &mut Vec<FieldIssue>, score: i32) {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        issues.push(FieldIssue::new(
            "score",
            format!("score must be between {MIN_SCORE} and {MAX_SCORE}"),
        ));
    }
}

fn check_email(issues: &mut Vec<FieldIssue>, email: &str) {
    let trimmed = email.trim();
    let looks_valid = trimmed
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);
    if !looks_valid {
        issues.push(FieldIssue::new("email", "email must be a valid address"));
    }
}

impl Validate for NewLead {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "campaignId", &self.campaign_id);
        require_non_empty(&mut issues, "name", &self.name);
        check_email(&mut issues, &self.email);
        check_score(&mut issues, self.score);
        issues
    }
}

/// Partial lead update. Absent and `null` fields are both left unchanged, so
/// `company` and `revenue` cannot be cleared once set.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LeadPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub revenue: Option<String>,
    pub score: Option<i32>,
    pub status: Option<String>,
}

impl LeadPatch {
    pub fn apply(self, lead: &mut Lead) {
        if let Some(name) = self.name {
            lead.name = name;
        }
        if let Some(email) = self.email {
            lead.email = email;
        }
        if self.company.is_some() {
            lead.company = self.company;
        }
        if self.revenue.is_some() {
            lead.revenue = self.revenue;
        }
        if let Some(score) = self.score {
            lead.score = score;
        }
        if let Some(status) = self.status {
            lead.status = status;
        }
    }
}

impl Validate for LeadPatch {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_optional_non_empty(&mut issues, "name", self.name.as_deref());
        if let Some(email) = &self.email {
            check_email(&mut issues, email);
        }
        if let Some(score) = self.score {
            check_score(&mut issues, score);
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn score_outside_range_is_rejected() {
        let lead: NewLead = serde_json::from_value(json!({
            "campaignId": "c1",
            "name": "Dana",
            "email": "dana@example.com",
            "score": 140
        }))
        .expect("lead should deserialize");
        let issues = lead.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "score");
    }

    #[test]
    fn missing_email_is_a_deserialization_error() {
        let err = serde_json::from_value::<NewLead>(json!({"campaignId": "c1", "name": "Dana"}))
            .expect_err("email is required");
        assert!(err.to_string().contains("missing field `email`"));
    }

    #[test]
    fn null_company_in_patch_keeps_the_old_value() {
        let mut lead = serde_json::from_value::<NewLead>(json!({
            "campaignId": "c1",
            "name": "Dana",
            "email": "dana@example.com",
            "company": "Acme",
            "revenue": "$1M"
        }))
        .expect("lead should deserialize")
        .into_lead("l1".into(), Utc::now());
        let patch: LeadPatch = serde_json::from_value(json!({"company": null, "score": 40}))
            .expect("patch should deserialize");
        patch.apply(&mut lead);
        assert_eq!(lead.company.as_deref(), Some("Acme"));
        assert_eq!(lead.revenue.as_deref(), Some("$1M"));
        assert_eq!(lead.score, 40);
    }

    #[test]
    fn email_shape_is_checked() {
        let mut issues = Vec::new();
        check_email(&mut issues, "not-an-email");
        check_email(&mut issues, "@example.com");
        check_email(&mut issues, "dana@example.com");
        assert_eq!(issues.len(), 2);
    }
}
