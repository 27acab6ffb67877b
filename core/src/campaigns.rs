use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{
    FieldIssue, Validate, require_decimal, require_non_empty, require_non_negative,
    require_optional_non_empty, require_optional_non_negative,
};

/// A membership/waitlist campaign owned by one user.
///
/// `current_members <= goal_members` is the business meaning but is not
/// enforced: campaigns are allowed to overshoot their goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub goal_members: i32,
    pub current_members: i32,
    /// Integer cents
    pub total_revenue: i32,
    /// Decimal percentage carried as a string (e.g. "12.5")
    pub conversion_rate: String,
    pub waitlist_size: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub name: String,
    pub goal_members: i32,
    #[serde(default)]
    pub current_members: i32,
    #[serde(default)]
    pub total_revenue: i32,
    #[serde(default = "default_conversion_rate")]
    pub conversion_rate: String,
    #[serde(default)]
    pub waitlist_size: i32,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_conversion_rate() -> String {
    "0".to_string()
}

fn default_status() -> String {
    "active".to_string()
}

impl NewCampaign {
    pub fn into_campaign(self, id: String, user_id: String, created_at: DateTime<Utc>) -> Campaign {
        Campaign {
            id,
            user_id,
            name: self.name,
            goal_members: self.goal_members,
            current_members: self.current_members,
            total_revenue: self.total_revenue,
            conversion_rate: self.conversion_rate.trim().to_string(),
            waitlist_size: self.waitlist_size,
            status: self.status,
            created_at,
        }
    }
}

impl Validate for NewCampaign {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "name", &self.name);
        require_non_negative(&mut issues, "goalMembers", self.goal_members);
        require_non_negative(&mut issues, "currentMembers", self.current_members);
        require_non_negative(&mut issues, "totalRevenue", self.total_revenue);
        require_decimal(&mut issues, "conversionRate", &self.conversion_rate);
        require_non_negative(&mut issues, "waitlistSize", self.waitlist_size);
        issues
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CampaignPatch {
    pub name: Option<String>,
    pub goal_members: Option<i32>,
    pub current_members: Option<i32>,
    pub total_revenue: Option<i32>,
    pub conversion_rate: Option<String>,
    pub waitlist_size: Option<i32>,
    pub status: Option<String>,
}

impl CampaignPatch {
    pub fn apply(self, campaign: &mut Campaign) {
        if let Some(name) = self.name {
            campaign.name = name;
        }
        if let Some(goal_members) = self.goal_members {
            campaign.goal_members = goal_members;
        }
        if let Some(current_members) = self.current_members {
            campaign.current_members = current_members;
        }
        if let Some(total_revenue) = self.total_revenue {
            campaign.total_revenue = total_revenue;
        }
        if let Some(conversion_rate) = self.conversion_rate {
            campaign.conversion_rate = conversion_rate.trim().to_string();
        }
        if let Some(waitlist_size) = self.waitlist_size {
            campaign.waitlist_size = waitlist_size;
        }
        if let Some(status) = self.status {
            campaign.status = status;
        }
    }
}

impl Validate for CampaignPatch {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_optional_non_empty(&mut issues, "name", self.name.as_deref());
        require_optional_non_negative(&mut issues, "goalMembers", self.goal_members);
        require_optional_non_negative(&mut issues, "currentMembers", self.current_members);
        require_optional_non_negative(&mut issues, "totalRevenue", self.total_revenue);
        if let Some(rate) = &self.conversion_rate {
            require_decimal(&mut issues, "conversionRate", rate);
        }
        require_optional_non_negative(&mut issues, "waitlistSize", self.waitlist_size);
        issues
    }
}
