//! Persistence seam. Handlers only ever see `Arc<dyn Storage>`; the concrete
//! backend is picked once at boot.
//!
//! Conventions shared by both backends:
//! - single-row reads and updates return `None` when the row does not exist
//! - deletes return whether a row was removed
//! - lists come back in creation order
//! - `create_*` takes the fully built entity (id and timestamps assigned by the
//!   caller) and returns it as stored

use async_trait::async_trait;
use sovereign_core::agents::{Agent, AgentPatch};
use sovereign_core::audit::AuditLog;
use sovereign_core::campaigns::{Campaign, CampaignPatch};
use sovereign_core::contracts::{Contract, ContractPatch};
use sovereign_core::decisions::{Decision, DecisionPatch, DecisionResolution};
use sovereign_core::leads::{Lead, LeadPatch};
use sovereign_core::time_entries::TimeEntry;
use sovereign_core::users::User;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync + 'static {
    async fn get_user(&self, id: &str) -> StorageResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;
    async fn create_user(&self, user: User) -> StorageResult<User>;

    async fn get_campaigns_by_user(&self, user_id: &str) -> StorageResult<Vec<Campaign>>;
    async fn get_campaign(&self, id: &str) -> StorageResult<Option<Campaign>>;
    async fn create_campaign(&self, campaign: Campaign) -> StorageResult<Campaign>;
    async fn update_campaign(&self, id: &str, patch: CampaignPatch)
    -> StorageResult<Option<Campaign>>;

    async fn get_leads_by_campaign(&self, campaign_id: &str) -> StorageResult<Vec<Lead>>;
    /// Leads across every campaign the user owns.
    async fn get_leads_by_user(&self, user_id: &str) -> StorageResult<Vec<Lead>>;
    async fn get_lead(&self, id: &str) -> StorageResult<Option<Lead>>;
    /// Inserts the lead and bumps the parent campaign's waitlist by one as a
    /// single atomic unit. `None` when the campaign does not exist.
    async fn create_lead(&self, lead: Lead) -> StorageResult<Option<Lead>>;
    async fn update_lead(&self, id: &str, patch: LeadPatch) -> StorageResult<Option<Lead>>;
    async fn delete_lead(&self, id: &str) -> StorageResult<bool>;

    async fn get_agents_by_user(&self, user_id: &str) -> StorageResult<Vec<Agent>>;
    async fn get_agent(&self, id: &str) -> StorageResult<Option<Agent>>;
    async fn create_agent(&self, agent: Agent) -> StorageResult<Agent>;
    async fn update_agent(&self, id: &str, patch: AgentPatch) -> StorageResult<Option<Agent>>;
    /// Decisions that referenced the agent keep their `agent_name` and lose
    /// their `agent_id`.
    async fn delete_agent(&self, id: &str) -> StorageResult<bool>;

    async fn get_decisions_by_user(&self, user_id: &str) -> StorageResult<Vec<Decision>>;
    async fn get_pending_decisions(&self, user_id: &str) -> StorageResult<Vec<Decision>>;
    async fn get_decision(&self, id: &str) -> StorageResult<Option<Decision>>;
    async fn create_decision(&self, decision: Decision) -> StorageResult<Decision>;
    async fn update_decision(&self, id: &str, patch: DecisionPatch)
    -> StorageResult<Option<Decision>>;
    /// Applies the resolution only while the decision is still pending.
    async fn resolve_decision(
        &self,
        id: &str,
        resolution: &DecisionResolution,
    ) -> StorageResult<Option<Decision>>;

    async fn get_contracts_by_user(&self, user_id: &str) -> StorageResult<Vec<Contract>>;
    async fn get_contract(&self, id: &str) -> StorageResult<Option<Contract>>;
    async fn create_contract(&self, contract: Contract) -> StorageResult<Contract>;
    async fn update_contract(&self, id: &str, patch: ContractPatch)
    -> StorageResult<Option<Contract>>;

    async fn get_time_entries_by_user(&self, user_id: &str) -> StorageResult<Vec<TimeEntry>>;
    async fn create_time_entry(&self, entry: TimeEntry) -> StorageResult<TimeEntry>;

    async fn get_audit_logs_by_user(&self, user_id: &str) -> StorageResult<Vec<AuditLog>>;
    async fn create_audit_log(&self, log: AuditLog) -> StorageResult<AuditLog>;
}
