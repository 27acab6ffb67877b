use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::agents::Agent;
use crate::campaigns::Campaign;
use crate::contracts::Contract;
use crate::decisions::Decision;

/// Aggregate numbers for the dashboard header. Recomputed on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_campaigns: usize,
    /// Cents, summed across campaigns
    pub total_revenue: i64,
    pub total_agents: usize,
    pub active_agents: usize,
    /// Minutes, summed across agents
    pub total_time_saved: i64,
    pub pending_decisions: usize,
    /// Contracts still pending or signed
    pub active_contracts: usize,
    /// Cents, summed across active contracts
    pub pipeline_value: i64,
}

impl DashboardStats {
    pub fn compute(
        campaigns: &[Campaign],
        agents: &[Agent],
        pending_decisions: &[Decision],
        contracts: &[Contract],
    ) -> Self {
        let active: Vec<&Contract> = contracts.iter().filter(|c| c.is_active()).collect();
        Self {
            total_campaigns: campaigns.len(),
            total_revenue: campaigns.iter().map(|c| i64::from(c.total_revenue)).sum(),
            total_agents: agents.len(),
            active_agents: agents.iter().filter(|a| a.is_running()).count(),
            total_time_saved: agents.iter().map(|a| i64::from(a.time_saved)).sum(),
            pending_decisions: pending_decisions.len(),
            active_contracts: active.len(),
            pipeline_value: active.iter().map(|c| i64::from(c.amount)).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::NewAgent;
    use crate::contracts::NewContract;
    use chrono::Utc;

    fn agent(status: &str, time_saved: i32) -> Agent {
        NewAgent {
            name: "a".into(),
            role: "r".into(),
            status: status.into(),
            uptime: "100%".into(),
            color: "c".into(),
            time_saved,
        }
        .into_agent("id".into(), "u".into(), Utc::now())
    }

    fn contract(status: &str, amount: i32) -> Contract {
        NewContract {
            client_name: "Acme".into(),
            amount,
            status: status.into(),
            sent_at: None,
        }
        .into_contract("id".into(), "u".into(), Utc::now())
    }

    #[test]
    fn sums_time_saved_and_counts_active_contracts() {
        let stats = DashboardStats::compute(
            &[],
            &[agent("Running", 120), agent("Paused", 45), agent("Running", 0)],
            &[],
            &[contract("pending", 100), contract("signed", 250), contract("paid", 999)],
        );
        assert_eq!(stats.total_time_saved, 165);
        assert_eq!(stats.active_agents, 2);
        assert_eq!(stats.total_agents, 3);
        assert_eq!(stats.active_contracts, 2);
        assert_eq!(stats.pipeline_value, 350);
    }

    #[test]
    fn empty_inputs_give_zeroes() {
        assert_eq!(DashboardStats::compute(&[], &[], &[], &[]), DashboardStats::default());
    }
}
