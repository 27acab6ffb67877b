use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Actions recorded in the audit log
pub mod actions {
    pub const DECISION_APPROVED: &str = "decision.approved";
    pub const DECISION_REJECTED: &str = "decision.rejected";
    pub const AGENT_DELETED: &str = "agent.deleted";
    pub const LEAD_DELETED: &str = "lead.deleted";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,
    pub user_id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub user_id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: serde_json::Value,
}

impl NewAuditLog {
    pub fn new(user_id: &str, action: &str, entity_type: &str, entity_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: Some(entity_id.to_string()),
            details: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn into_audit_log(self, id: String, created_at: DateTime<Utc>) -> AuditLog {
        AuditLog {
            id,
            user_id: self.user_id,
            action: self.action,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            details: self.details,
            created_at,
        }
    }
}
