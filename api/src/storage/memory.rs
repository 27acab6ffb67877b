//! In-process backend used by tests and `SOVEREIGN_STORAGE=memory` dev runs.
//! One write lock guards every table, so multi-table operations such as lead
//! creation are atomic here too.

use async_trait::async_trait;
use sovereign_core::agents::{Agent, AgentPatch};
use sovereign_core::audit::AuditLog;
use sovereign_core::campaigns::{Campaign, CampaignPatch};
use sovereign_core::contracts::{Contract, ContractPatch};
use sovereign_core::decisions::{Decision, DecisionPatch, DecisionResolution};
use sovereign_core::leads::{Lead, LeadPatch};
use sovereign_core::time_entries::TimeEntry;
use sovereign_core::users::User;
use tokio::sync::RwLock;

use super::{Storage, StorageResult};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    campaigns: Vec<Campaign>,
    leads: Vec<Lead>,
    agents: Vec<Agent>,
    decisions: Vec<Decision>,
    contracts: Vec<Contract>,
    time_entries: Vec<TimeEntry>,
    audit_logs: Vec<AuditLog>,
}

#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find<T: Clone>(rows: &[T], pred: impl Fn(&T) -> bool) -> Option<T> {
    rows.iter().find(|row| pred(row)).cloned()
}

fn filter<T: Clone>(rows: &[T], pred: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().filter(|row| pred(row)).cloned().collect()
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_user(&self, id: &str) -> StorageResult<Option<User>> {
        Ok(find(&self.tables.read().await.users, |u| u.id == id))
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        Ok(find(&self.tables.read().await.users, |u| u.username == username))
    }

    async fn create_user(&self, user: User) -> StorageResult<User> {
        self.tables.write().await.users.push(user.clone());
        Ok(user)
    }

    async fn get_campaigns_by_user(&self, user_id: &str) -> StorageResult<Vec<Campaign>> {
        Ok(filter(&self.tables.read().await.campaigns, |c| c.user_id == user_id))
    }

    async fn get_campaign(&self, id: &str) -> StorageResult<Option<Campaign>> {
        Ok(find(&self.tables.read().await.campaigns, |c| c.id == id))
    }

    async fn create_campaign(&self, campaign: Campaign) -> StorageResult<Campaign> {
        self.tables.write().await.campaigns.push(campaign.clone());
        Ok(campaign)
    }

    async fn update_campaign(
        &self,
        id: &str,
        patch: CampaignPatch,
    ) -> StorageResult<Option<Campaign>> {
        let mut tables = self.tables.write().await;
        Ok(tables.campaigns.iter_mut().find(|c| c.id == id).map(|campaign| {
            patch.apply(campaign);
            campaign.clone()
        }))
    }

    async fn get_leads_by_campaign(&self, campaign_id: &str) -> StorageResult<Vec<Lead>> {
        Ok(filter(&self.tables.read().await.leads, |l| l.campaign_id == campaign_id))
    }

    async fn get_leads_by_user(&self, user_id: &str) -> StorageResult<Vec<Lead>> {
        let tables = self.tables.read().await;
        Ok(filter(&tables.leads, |lead| {
            tables
                .campaigns
                .iter()
                .any(|c| c.id == lead.campaign_id && c.user_id == user_id)
        }))
    }

    async fn get_lead(&self, id: &str) -> StorageResult<Option<Lead>> {
        Ok(find(&self.tables.read().await.leads, |l| l.id == id))
    }

    async fn create_lead(&self, lead: Lead) -> StorageResult<Option<Lead>> {
        let mut tables = self.tables.write().await;
        let Some(campaign) = tables.campaigns.iter_mut().find(|c| c.id == lead.campaign_id) else {
            return Ok(None);
        };
        campaign.waitlist_size += 1;
        tables.leads.push(lead.clone());
        Ok(Some(lead))
    }

    async fn update_lead(&self, id: &str, patch: LeadPatch) -> StorageResult<Option<Lead>> {
        let mut tables = self.tables.write().await;
        Ok(tables.leads.iter_mut().find(|l| l.id == id).map(|lead| {
            patch.apply(lead);
            lead.clone()
        }))
    }

    async fn delete_lead(&self, id: &str) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.leads.len();
        tables.leads.retain(|l| l.id != id);
        Ok(tables.leads.len() != before)
    }

    async fn get_agents_by_user(&self, user_id: &str) -> StorageResult<Vec<Agent>> {
        Ok(filter(&self.tables.read().await.agents, |a| a.user_id == user_id))
    }

    async fn get_agent(&self, id: &str) -> StorageResult<Option<Agent>> {
        Ok(find(&self.tables.read().await.agents, |a| a.id == id))
    }

    async fn create_agent(&self, agent: Agent) -> StorageResult<Agent> {
        self.tables.write().await.agents.push(agent.clone());
        Ok(agent)
    }

    async fn update_agent(&self, id: &str, patch: AgentPatch) -> StorageResult<Option<Agent>> {
        let mut tables = self.tables.write().await;
        Ok(tables.agents.iter_mut().find(|a| a.id == id).map(|agent| {
            patch.apply(agent);
            agent.clone()
        }))
    }

    async fn delete_agent(&self, id: &str) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.agents.len();
        tables.agents.retain(|a| a.id != id);
        let removed = tables.agents.len() != before;
        if removed {
            for decision in tables
                .decisions
                .iter_mut()
                .filter(|d| d.agent_id.as_deref() == Some(id))
            {
                decision.agent_id = None;
            }
        }
        Ok(removed)
    }

    async fn get_decisions_by_user(&self, user_id: &str) -> StorageResult<Vec<Decision>> {
        Ok(filter(&self.tables.read().await.decisions, |d| d.user_id == user_id))
    }

    async fn get_pending_decisions(&self, user_id: &str) -> StorageResult<Vec<Decision>> {
        Ok(filter(&self.tables.read().await.decisions, |d| {
            d.user_id == user_id && d.is_pending()
        }))
    }

    async fn get_decision(&self, id: &str) -> StorageResult<Option<Decision>> {
        Ok(find(&self.tables.read().await.decisions, |d| d.id == id))
    }

    async fn create_decision(&self, decision: Decision) -> StorageResult<Decision> {
        self.tables.write().await.decisions.push(decision.clone());
        Ok(decision)
    }

    async fn update_decision(
        &self,
        id: &str,
        patch: DecisionPatch,
    ) -> StorageResult<Option<Decision>> {
        let mut tables = self.tables.write().await;
        Ok(tables.decisions.iter_mut().find(|d| d.id == id).map(|decision| {
            patch.apply(decision);
            decision.clone()
        }))
    }

    async fn resolve_decision(
        &self,
        id: &str,
        resolution: &DecisionResolution,
    ) -> StorageResult<Option<Decision>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .decisions
            .iter_mut()
            .find(|d| d.id == id && d.is_pending())
            .map(|decision| {
                resolution.apply(decision);
                decision.clone()
            }))
    }

    async fn get_contracts_by_user(&self, user_id: &str) -> StorageResult<Vec<Contract>> {
        Ok(filter(&self.tables.read().await.contracts, |c| c.user_id == user_id))
    }

    async fn get_contract(&self, id: &str) -> StorageResult<Option<Contract>> {
        Ok(find(&self.tables.read().await.contracts, |c| c.id == id))
    }

    async fn create_contract(&self, contract: Contract) -> StorageResult<Contract> {
        self.tables.write().await.contracts.push(contract.clone());
        Ok(contract)
    }

    async fn update_contract(
        &self,
        id: &str,
        patch: ContractPatch,
    ) -> StorageResult<Option<Contract>> {
        let mut tables = self.tables.write().await;
        Ok(tables.contracts.iter_mut().find(|c| c.id == id).map(|contract| {
            patch.apply(contract);
            contract.clone()
        }))
    }

    async fn get_time_entries_by_user(&self, user_id: &str) -> StorageResult<Vec<TimeEntry>> {
        Ok(filter(&self.tables.read().await.time_entries, |t| t.user_id == user_id))
    }

    async fn create_time_entry(&self, entry: TimeEntry) -> StorageResult<TimeEntry> {
        self.tables.write().await.time_entries.push(entry.clone());
        Ok(entry)
    }

    async fn get_audit_logs_by_user(&self, user_id: &str) -> StorageResult<Vec<AuditLog>> {
        Ok(filter(&self.tables.read().await.audit_logs, |l| l.user_id == user_id))
    }

    async fn create_audit_log(&self, log: AuditLog) -> StorageResult<AuditLog> {
        self.tables.write().await.audit_logs.push(log.clone());
        Ok(log)
    }
}
