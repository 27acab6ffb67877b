use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{
    FieldIssue, Validate, require_non_empty, require_non_negative, require_optional_non_empty,
    require_optional_non_negative,
};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_SIGNED: &str = "signed";
pub const STATUS_PAID: &str = "paid";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    pub user_id: String,
    pub client_name: String,
    /// Integer cents
    pub amount: i32,
    pub status: String,
    pub sent_at: DateTime<Utc>,
}

impl Contract {
    /// Pending and signed contracts are still in flight; paid ones are closed.
    pub fn is_active(&self) -> bool {
        self.status == STATUS_PENDING || self.status == STATUS_SIGNED
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewContract {
    pub client_name: String,
    pub amount: i32,
    #[serde(default = "default_status")]
    pub status: String,
    /// Defaults to the time of creation
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

fn default_status() -> String {
    STATUS_PENDING.to_string()
}

impl NewContract {
    pub fn into_contract(self, id: String, user_id: String, now: DateTime<Utc>) -> Contract {
        Contract {
            id,
            user_id,
            client_name: self.client_name,
            amount: self.amount,
            status: self.status,
            sent_at: self.sent_at.unwrap_or(now),
        }
    }
}

impl Validate for NewContract {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "clientName", &self.client_name);
        require_non_negative(&mut issues, "amount", self.amount);
        require_non_empty(&mut issues, "status", &self.status);
        issues
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContractPatch {
    pub client_name: Option<String>,
    pub amount: Option<i32>,
    pub status: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl ContractPatch {
    pub fn apply(self, contract: &mut Contract) {
        if let Some(client_name) = self.client_name {
            contract.client_name = client_name;
        }
        if let Some(amount) = self.amount {
            contract.amount = amount;
        }
        if let Some(status) = self.status {
            contract.status = status;
        }
        if let Some(sent_at) = self.sent_at {
            contract.sent_at = sent_at;
        }
    }
}

impl Validate for ContractPatch {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_optional_non_empty(&mut issues, "clientName", self.client_name.as_deref());
        require_optional_non_negative(&mut issues, "amount", self.amount);
        require_optional_non_empty(&mut issues, "status", self.status.as_deref());
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_contracts_are_not_active() {
        let now = Utc::now();
        let mut contract = NewContract {
            client_name: "Acme".into(),
            amount: 250_000,
            status: STATUS_SIGNED.into(),
            sent_at: None,
        }
        .into_contract("k1".into(), "u1".into(), now);
        assert_eq!(contract.sent_at, now);
        assert!(contract.is_active());

        contract.status = STATUS_PAID.into();
        assert!(!contract.is_active());
    }
}
