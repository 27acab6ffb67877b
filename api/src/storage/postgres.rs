use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sovereign_core::agents::{Agent, AgentPatch};
use sovereign_core::audit::AuditLog;
use sovereign_core::campaigns::{Campaign, CampaignPatch};
use sovereign_core::contracts::{Contract, ContractPatch};
use sovereign_core::decisions::{Decision, DecisionOption, DecisionPatch, DecisionResolution};
use sovereign_core::drip::DripCategory;
use sovereign_core::leads::{Lead, LeadPatch};
use sovereign_core::time_entries::TimeEntry;
use sovereign_core::users::User;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Postgres, Transaction};

use super::{Storage, StorageError, StorageResult};
use crate::config::DatabaseConfig;

const CAMPAIGN_COLUMNS: &str = "id, user_id, name, goal_members, current_members, total_revenue, \
     conversion_rate::text AS conversion_rate, waitlist_size, status, created_at";
const LEAD_COLUMNS: &str =
    "id, campaign_id, name, email, company, revenue, score, status, created_at";
const AGENT_COLUMNS: &str =
    "id, user_id, name, role, status, uptime, color, time_saved, created_at";
const DECISION_COLUMNS: &str = "id, user_id, agent_id, agent_name, title, description, \
     type AS decision_type, priority, recommendation, status, chosen_option, resolved_at, created_at";
const CONTRACT_COLUMNS: &str = "id, user_id, client_name, amount, status, sent_at";
const TIME_ENTRY_COLUMNS: &str = "id, user_id, task, category, duration, created_at";
const AUDIT_COLUMNS: &str = "id, user_id, action, entity_type, entity_id, details, created_at";

/// Postgres backend. The pool is built once at boot and cloned into handlers
/// through `AppState`.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub async fn connect(config: &DatabaseConfig) -> StorageResult<Self> {
        let mut options = PgConnectOptions::from_str(&config.url)?;
        if config.require_tls {
            options = options.ssl_mode(PgSslMode::Require);
        }
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn load_options(
        &self,
        decision_ids: &[String],
    ) -> StorageResult<HashMap<String, Vec<DecisionOption>>> {
        let rows = sqlx::query_as::<_, OptionRow>(
            r#"
            SELECT decision_id, position, label, description
            FROM decision_options
            WHERE decision_id = ANY($1)
            ORDER BY decision_id, position
            "#,
        )
        .bind(decision_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_decision: HashMap<String, Vec<DecisionOption>> = HashMap::new();
        for row in rows {
            by_decision
                .entry(row.decision_id)
                .or_default()
                .push(DecisionOption {
                    label: row.label,
                    description: row.description,
                });
        }
        Ok(by_decision)
    }

    async fn attach_options(&self, rows: Vec<DecisionRow>) -> StorageResult<Vec<Decision>> {
        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let mut options = self.load_options(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let opts = options.remove(&row.id).unwrap_or_default();
                row.into_decision(opts)
            })
            .collect())
    }

    async fn decisions_where(&self, clause: &str, user_id: &str) -> StorageResult<Vec<Decision>> {
        let rows = sqlx::query_as::<_, DecisionRow>(&format!(
            "SELECT {DECISION_COLUMNS} FROM decisions WHERE {clause} ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_options(rows).await
    }
}

async fn insert_options(
    tx: &mut Transaction<'_, Postgres>,
    decision_id: &str,
    options: &[DecisionOption],
) -> StorageResult<()> {
    for (position, option) in options.iter().enumerate() {
        sqlx::query(
            "INSERT INTO decision_options (decision_id, position, label, description) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(decision_id)
        .bind(position as i32)
        .bind(&option.label)
        .bind(&option.description)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl Storage for PgStorage {
    async fn get_user(&self, id: &str) -> StorageResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, email, name, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserRow::into_user))
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, email, name, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserRow::into_user))
    }

    async fn create_user(&self, user: User) -> StorageResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, password_hash, email, name, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, password_hash, email, name, role
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_user())
    }

    async fn get_campaigns_by_user(&self, user_id: &str) -> StorageResult<Vec<Campaign>> {
        let rows = sqlx::query_as::<_, CampaignRow>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CampaignRow::into_campaign).collect())
    }

    async fn get_campaign(&self, id: &str) -> StorageResult<Option<Campaign>> {
        let row = sqlx::query_as::<_, CampaignRow>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CampaignRow::into_campaign))
    }

    async fn create_campaign(&self, campaign: Campaign) -> StorageResult<Campaign> {
        let row = sqlx::query_as::<_, CampaignRow>(&format!(
            r#"
            INSERT INTO campaigns (
                id, user_id, name, goal_members, current_members, total_revenue,
                conversion_rate, waitlist_size, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7::numeric, $8, $9, $10)
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(&campaign.id)
        .bind(&campaign.user_id)
        .bind(&campaign.name)
        .bind(campaign.goal_members)
        .bind(campaign.current_members)
        .bind(campaign.total_revenue)
        .bind(&campaign.conversion_rate)
        .bind(campaign.waitlist_size)
        .bind(&campaign.status)
        .bind(campaign.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_campaign())
    }

    async fn update_campaign(
        &self,
        id: &str,
        patch: CampaignPatch,
    ) -> StorageResult<Option<Campaign>> {
        let row = sqlx::query_as::<_, CampaignRow>(&format!(
            r#"
            UPDATE campaigns SET
                name = COALESCE($2, name),
                goal_members = COALESCE($3, goal_members),
                current_members = COALESCE($4, current_members),
                total_revenue = COALESCE($5, total_revenue),
                conversion_rate = COALESCE($6::numeric, conversion_rate),
                waitlist_size = COALESCE($7, waitlist_size),
                status = COALESCE($8, status)
            WHERE id = $1
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.goal_members)
        .bind(patch.current_members)
        .bind(patch.total_revenue)
        .bind(patch.conversion_rate.map(|r| r.trim().to_string()))
        .bind(patch.waitlist_size)
        .bind(patch.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CampaignRow::into_campaign))
    }

    async fn get_leads_by_campaign(&self, campaign_id: &str) -> StorageResult<Vec<Lead>> {
        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE campaign_id = $1 ORDER BY created_at, id"
        ))
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LeadRow::into_lead).collect())
    }

    async fn get_leads_by_user(&self, user_id: &str) -> StorageResult<Vec<Lead>> {
        let rows = sqlx::query_as::<_, LeadRow>(
            r#"
            SELECT l.id, l.campaign_id, l.name, l.email, l.company, l.revenue,
                   l.score, l.status, l.created_at
            FROM leads l
            JOIN campaigns c ON c.id = l.campaign_id
            WHERE c.user_id = $1
            ORDER BY l.created_at, l.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LeadRow::into_lead).collect())
    }

    async fn get_lead(&self, id: &str) -> StorageResult<Option<Lead>> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(LeadRow::into_lead))
    }

    async fn create_lead(&self, lead: Lead) -> StorageResult<Option<Lead>> {
        let mut tx = self.pool.begin().await?;

        // Row-locking increment; concurrent lead inserts serialize here.
        let bumped = sqlx::query(
            "UPDATE campaigns SET waitlist_size = waitlist_size + 1 WHERE id = $1",
        )
        .bind(&lead.campaign_id)
        .execute(&mut *tx)
        .await?;
        if bumped.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query_as::<_, LeadRow>(&format!(
            r#"
            INSERT INTO leads (id, campaign_id, name, email, company, revenue, score, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(&lead.id)
        .bind(&lead.campaign_id)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.company)
        .bind(&lead.revenue)
        .bind(lead.score)
        .bind(&lead.status)
        .bind(lead.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row.into_lead()))
    }

    async fn update_lead(&self, id: &str, patch: LeadPatch) -> StorageResult<Option<Lead>> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            r#"
            UPDATE leads SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                company = COALESCE($4, company),
                revenue = COALESCE($5, revenue),
                score = COALESCE($6, score),
                status = COALESCE($7, status)
            WHERE id = $1
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.company)
        .bind(patch.revenue)
        .bind(patch.score)
        .bind(patch.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(LeadRow::into_lead))
    }

    async fn delete_lead(&self, id: &str) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_agents_by_user(&self, user_id: &str) -> StorageResult<Vec<Agent>> {
        let rows = sqlx::query_as::<_, AgentRow>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AgentRow::into_agent).collect())
    }

    async fn get_agent(&self, id: &str) -> StorageResult<Option<Agent>> {
        let row = sqlx::query_as::<_, AgentRow>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(AgentRow::into_agent))
    }

    async fn create_agent(&self, agent: Agent) -> StorageResult<Agent> {
        let row = sqlx::query_as::<_, AgentRow>(&format!(
            r#"
            INSERT INTO agents (id, user_id, name, role, status, uptime, color, time_saved, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {AGENT_COLUMNS}
            "#
        ))
        .bind(&agent.id)
        .bind(&agent.user_id)
        .bind(&agent.name)
        .bind(&agent.role)
        .bind(&agent.status)
        .bind(&agent.uptime)
        .bind(&agent.color)
        .bind(agent.time_saved)
        .bind(agent.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_agent())
    }

    async fn update_agent(&self, id: &str, patch: AgentPatch) -> StorageResult<Option<Agent>> {
        let row = sqlx::query_as::<_, AgentRow>(&format!(
            r#"
            UPDATE agents SET
                name = COALESCE($2, name),
                role = COALESCE($3, role),
                status = COALESCE($4, status),
                uptime = COALESCE($5, uptime),
                color = COALESCE($6, color),
                time_saved = COALESCE($7, time_saved)
            WHERE id = $1
            RETURNING {AGENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.role)
        .bind(patch.status)
        .bind(patch.uptime)
        .bind(patch.color)
        .bind(patch.time_saved)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(AgentRow::into_agent))
    }

    async fn delete_agent(&self, id: &str) -> StorageResult<bool> {
        // decisions.agent_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM agents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_decisions_by_user(&self, user_id: &str) -> StorageResult<Vec<Decision>> {
        self.decisions_where("user_id = $1", user_id).await
    }

    async fn get_pending_decisions(&self, user_id: &str) -> StorageResult<Vec<Decision>> {
        self.decisions_where("user_id = $1 AND status = 'pending'", user_id)
            .await
    }

    async fn get_decision(&self, id: &str) -> StorageResult<Option<Decision>> {
        let row = sqlx::query_as::<_, DecisionRow>(&format!(
            "SELECT {DECISION_COLUMNS} FROM decisions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self.attach_options(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_decision(&self, decision: Decision) -> StorageResult<Decision> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, DecisionRow>(&format!(
            r#"
            INSERT INTO decisions (
                id, user_id, agent_id, agent_name, title, description, type,
                priority, recommendation, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {DECISION_COLUMNS}
            "#
        ))
        .bind(&decision.id)
        .bind(&decision.user_id)
        .bind(&decision.agent_id)
        .bind(&decision.agent_name)
        .bind(&decision.title)
        .bind(&decision.description)
        .bind(&decision.decision_type)
        .bind(&decision.priority)
        .bind(decision.recommendation)
        .bind(&decision.status)
        .bind(decision.created_at)
        .fetch_one(&mut *tx)
        .await?;

        insert_options(&mut tx, &decision.id, &decision.options).await?;
        tx.commit().await?;

        Ok(row.into_decision(decision.options))
    }

    async fn update_decision(
        &self,
        id: &str,
        patch: DecisionPatch,
    ) -> StorageResult<Option<Decision>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, DecisionRow>(&format!(
            r#"
            UPDATE decisions SET
                agent_name = COALESCE($2, agent_name),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                type = COALESCE($5, type),
                priority = COALESCE($6, priority),
                recommendation = COALESCE($7, recommendation),
                status = COALESCE($8, status)
            WHERE id = $1
            RETURNING {DECISION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.agent_name)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.decision_type)
        .bind(patch.priority)
        .bind(patch.recommendation)
        .bind(patch.status)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Some(options) = &patch.options {
            sqlx::query("DELETE FROM decision_options WHERE decision_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_options(&mut tx, id, options).await?;
        }

        // Deferred foreign keys on recommendation/chosen_option are checked here.
        tx.commit().await?;

        Ok(self.attach_options(vec![row]).await?.pop())
    }

    async fn resolve_decision(
        &self,
        id: &str,
        resolution: &DecisionResolution,
    ) -> StorageResult<Option<Decision>> {
        let row = sqlx::query_as::<_, DecisionRow>(&format!(
            r#"
            UPDATE decisions
            SET status = $2, chosen_option = $3, resolved_at = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING {DECISION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&resolution.status)
        .bind(resolution.chosen_option)
        .bind(resolution.resolved_at)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self.attach_options(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn get_contracts_by_user(&self, user_id: &str) -> StorageResult<Vec<Contract>> {
        let rows = sqlx::query_as::<_, ContractRow>(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE user_id = $1 ORDER BY sent_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ContractRow::into_contract).collect())
    }

    async fn get_contract(&self, id: &str) -> StorageResult<Option<Contract>> {
        let row = sqlx::query_as::<_, ContractRow>(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ContractRow::into_contract))
    }

    async fn create_contract(&self, contract: Contract) -> StorageResult<Contract> {
        let row = sqlx::query_as::<_, ContractRow>(&format!(
            r#"
            INSERT INTO contracts (id, user_id, client_name, amount, status, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CONTRACT_COLUMNS}
            "#
        ))
        .bind(&contract.id)
        .bind(&contract.user_id)
        .bind(&contract.client_name)
        .bind(contract.amount)
        .bind(&contract.status)
        .bind(contract.sent_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_contract())
    }

    async fn update_contract(
        &self,
        id: &str,
        patch: ContractPatch,
    ) -> StorageResult<Option<Contract>> {
        let row = sqlx::query_as::<_, ContractRow>(&format!(
            r#"
            UPDATE contracts SET
                client_name = COALESCE($2, client_name),
                amount = COALESCE($3, amount),
                status = COALESCE($4, status),
                sent_at = COALESCE($5, sent_at)
            WHERE id = $1
            RETURNING {CONTRACT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.client_name)
        .bind(patch.amount)
        .bind(patch.status)
        .bind(patch.sent_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ContractRow::into_contract))
    }

    async fn get_time_entries_by_user(&self, user_id: &str) -> StorageResult<Vec<TimeEntry>> {
        let rows = sqlx::query_as::<_, TimeEntryRow>(&format!(
            "SELECT {TIME_ENTRY_COLUMNS} FROM time_entries WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TimeEntryRow::into_time_entry).collect()
    }

    async fn create_time_entry(&self, entry: TimeEntry) -> StorageResult<TimeEntry> {
        let row = sqlx::query_as::<_, TimeEntryRow>(&format!(
            r#"
            INSERT INTO time_entries (id, user_id, task, category, duration, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TIME_ENTRY_COLUMNS}
            "#
        ))
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.task)
        .bind(entry.category.as_str())
        .bind(entry.duration)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await?;
        row.into_time_entry()
    }

    async fn get_audit_logs_by_user(&self, user_id: &str) -> StorageResult<Vec<AuditLog>> {
        let rows = sqlx::query_as::<_, AuditRow>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AuditRow::into_audit_log).collect())
    }

    async fn create_audit_log(&self, log: AuditLog) -> StorageResult<AuditLog> {
        let row = sqlx::query_as::<_, AuditRow>(&format!(
            r#"
            INSERT INTO audit_logs (id, user_id, action, entity_type, entity_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {AUDIT_COLUMNS}
            "#
        ))
        .bind(&log.id)
        .bind(&log.user_id)
        .bind(&log.action)
        .bind(&log.entity_type)
        .bind(&log.entity_id)
        .bind(&log.details)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_audit_log())
    }
}

// --- Row types for sqlx mapping ---

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    email: String,
    name: String,
    role: String,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            email: self.email,
            name: self.name,
            role: self.role,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CampaignRow {
    id: String,
    user_id: String,
    name: String,
    goal_members: i32,
    current_members: i32,
    total_revenue: i32,
    conversion_rate: String,
    waitlist_size: i32,
    status: String,
    created_at: DateTime<Utc>,
}

impl CampaignRow {
    fn into_campaign(self) -> Campaign {
        Campaign {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            goal_members: self.goal_members,
            current_members: self.current_members,
            total_revenue: self.total_revenue,
            conversion_rate: self.conversion_rate,
            waitlist_size: self.waitlist_size,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LeadRow {
    id: String,
    campaign_id: String,
    name: String,
    email: String,
    company: Option<String>,
    revenue: Option<String>,
    score: i32,
    status: String,
    created_at: DateTime<Utc>,
}

impl LeadRow {
    fn into_lead(self) -> Lead {
        Lead {
            id: self.id,
            campaign_id: self.campaign_id,
            name: self.name,
            email: self.email,
            company: self.company,
            revenue: self.revenue,
            score: self.score,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AgentRow {
    id: String,
    user_id: String,
    name: String,
    role: String,
    status: String,
    uptime: String,
    color: String,
    time_saved: i32,
    created_at: DateTime<Utc>,
}

impl AgentRow {
    fn into_agent(self) -> Agent {
        Agent {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            role: self.role,
            status: self.status,
            uptime: self.uptime,
            color: self.color,
            time_saved: self.time_saved,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DecisionRow {
    id: String,
    user_id: String,
    agent_id: Option<String>,
    agent_name: String,
    title: String,
    description: String,
    decision_type: String,
    priority: String,
    recommendation: i32,
    status: String,
    chosen_option: Option<i32>,
    resolved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl DecisionRow {
    fn into_decision(self, options: Vec<DecisionOption>) -> Decision {
        Decision {
            id: self.id,
            user_id: self.user_id,
            agent_id: self.agent_id,
            agent_name: self.agent_name,
            title: self.title,
            description: self.description,
            decision_type: self.decision_type,
            priority: self.priority,
            options,
            recommendation: self.recommendation,
            status: self.status,
            chosen_option: self.chosen_option,
            resolved_at: self.resolved_at,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OptionRow {
    decision_id: String,
    #[allow(dead_code)]
    position: i32,
    label: String,
    description: String,
}

#[derive(sqlx::FromRow)]
struct ContractRow {
    id: String,
    user_id: String,
    client_name: String,
    amount: i32,
    status: String,
    sent_at: DateTime<Utc>,
}

impl ContractRow {
    fn into_contract(self) -> Contract {
        Contract {
            id: self.id,
            user_id: self.user_id,
            client_name: self.client_name,
            amount: self.amount,
            status: self.status,
            sent_at: self.sent_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TimeEntryRow {
    id: String,
    user_id: String,
    task: String,
    category: String,
    duration: i32,
    created_at: DateTime<Utc>,
}

impl TimeEntryRow {
    fn into_time_entry(self) -> StorageResult<TimeEntry> {
        let category = self
            .category
            .parse::<DripCategory>()
            .map_err(|e| StorageError::Corrupt {
                table: "time_entries",
                reason: e.to_string(),
            })?;
        Ok(TimeEntry {
            id: self.id,
            user_id: self.user_id,
            task: self.task,
            category,
            duration: self.duration,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: String,
    user_id: String,
    action: String,
    entity_type: String,
    entity_id: Option<String>,
    details: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl AuditRow {
    fn into_audit_log(self) -> AuditLog {
        AuditLog {
            id: self.id,
            user_id: self.user_id,
            action: self.action,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            details: self.details,
            created_at: self.created_at,
        }
    }
}
