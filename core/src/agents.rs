use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{
    FieldIssue, Validate, require_non_empty, require_non_negative, require_optional_non_empty,
    require_optional_non_negative,
};

pub const STATUS_RUNNING: &str = "Running";
pub const STATUS_PAUSED: &str = "Paused";

/// A background automation agent shown on the dashboard.
///
/// `status` is free-form. Clients toggle between "Running" and "Paused" by
/// convention; the server does not enforce a state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub role: String,
    pub status: String,
    /// Display string such as "99.9%", never computed server-side
    pub uptime: String,
    /// CSS class hint for the client
    pub color: String,
    /// Minutes saved so far
    pub time_saved: i32,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    pub fn is_running(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_RUNNING)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    pub name: String,
    pub role: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_uptime")]
    pub uptime: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub time_saved: i32,
}

fn default_status() -> String {
    STATUS_RUNNING.to_string()
}

fn default_uptime() -> String {
    "100%".to_string()
}

fn default_color() -> String {
    "text-cyan-400".to_string()
}

impl NewAgent {
    pub fn into_agent(self, id: String, user_id: String, created_at: DateTime<Utc>) -> Agent {
        Agent {
            id,
            user_id,
            name: self.name,
            role: self.role,
            status: self.status,
            uptime: self.uptime,
            color: self.color,
            time_saved: self.time_saved,
            created_at,
        }
    }
}

impl Validate for NewAgent {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "name", &self.name);
        require_non_empty(&mut issues, "role", &self.role);
        require_non_empty(&mut issues, "status", &self.status);
        require_non_negative(&mut issues, "timeSaved", self.time_saved);
        issues
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub uptime: Option<String>,
    pub color: Option<String>,
    pub time_saved: Option<i32>,
}

impl AgentPatch {
    pub fn status(status: &str) -> Self {
        Self {
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    pub fn apply(self, agent: &mut Agent) {
        if let Some(name) = self.name {
            agent.name = name;
        }
        if let Some(role) = self.role {
            agent.role = role;
        }
        if let Some(status) = self.status {
            agent.status = status;
        }
        if let Some(uptime) = self.uptime {
            agent.uptime = uptime;
        }
        if let Some(color) = self.color {
            agent.color = color;
        }
        if let Some(time_saved) = self.time_saved {
            agent.time_saved = time_saved;
        }
    }
}

impl Validate for AgentPatch {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_optional_non_empty(&mut issues, "name", self.name.as_deref());
        require_optional_non_empty(&mut issues, "role", self.role.as_deref());
        require_optional_non_empty(&mut issues, "status", self.status.as_deref());
        require_optional_non_negative(&mut issues, "timeSaved", self.time_saved);
        issues
    }
}
