//! Boot-time data: the demo account every unauthenticated request acts as,
//! and an optional sample workspace for local development.

use chrono::{Duration, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sovereign_core::agents::{Agent, STATUS_RUNNING};
use sovereign_core::auth::{PasswordError, hash_password};
use sovereign_core::campaigns::Campaign;
use sovereign_core::contracts::{self, Contract};
use sovereign_core::decisions::{self, Decision, DecisionOption};
use sovereign_core::drip::DripCategory;
use sovereign_core::leads::Lead;
use sovereign_core::new_id;
use sovereign_core::time_entries::TimeEntry;
use sovereign_core::users::User;

use crate::storage::{Storage, StorageError};

const DEMO_USERNAME: &str = "demo";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Creates the demo user if it is missing. Its password is random and never
/// printed, so the account can only be used through the demo fallback.
///
/// The username is `demo`, or `demo-<id>` when `demo` already belongs to a
/// user created under an earlier demo id.
pub async fn ensure_demo_user(storage: &dyn Storage, demo_user_id: &str) -> Result<User, SeedError> {
    if let Some(user) = storage.get_user(demo_user_id).await? {
        return Ok(user);
    }

    let username = match storage.get_user_by_username(DEMO_USERNAME).await? {
        Some(_) => format!("{DEMO_USERNAME}-{demo_user_id}"),
        None => DEMO_USERNAME.to_string(),
    };

    let password: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();

    let user = storage
        .create_user(User {
            id: demo_user_id.to_string(),
            username,
            password_hash: hash_password(&password)?,
            email: "demo@sovereign.local".to_string(),
            name: "Demo Founder".to_string(),
            role: "owner".to_string(),
        })
        .await?;
    tracing::info!(user_id = %user.id, "created demo user");
    Ok(user)
}

/// Sample workspace for `user_id`. Skipped when the user already owns a
/// campaign, so repeated boots do not duplicate rows.
pub async fn seed_demo_data(storage: &dyn Storage, user_id: &str) -> Result<bool, SeedError> {
    if !storage.get_campaigns_by_user(user_id).await?.is_empty() {
        tracing::debug!(user_id = %user_id, "demo data already present");
        return Ok(false);
    }

    let now = Utc::now();
    let campaign = storage
        .create_campaign(Campaign {
            id: new_id(),
            user_id: user_id.to_string(),
            name: "Founders Circle".to_string(),
            goal_members: 100,
            current_members: 12,
            total_revenue: 1_188_000,
            conversion_rate: "12.5".to_string(),
            waitlist_size: 0,
            status: "active".to_string(),
            created_at: now,
        })
        .await?;

    for (name, email, company, score) in [
        ("Ada Park", "ada@northwind.io", "Northwind", 82),
        ("Sam Okafor", "sam@brightlabs.co", "Bright Labs", 64),
    ] {
        storage
            .create_lead(Lead {
                id: new_id(),
                campaign_id: campaign.id.clone(),
                name: name.to_string(),
                email: email.to_string(),
                company: Some(company.to_string()),
                revenue: None,
                score,
                status: "New".to_string(),
                created_at: now,
            })
            .await?;
    }

    let mut agents = Vec::new();
    for (name, role, color, time_saved) in [
        ("Inbox Sentinel", "Email triage", "#3b82f6", 96),
        ("The Closer", "Sales calls and proposals", "#f59e0b", 48),
        ("Content Alchemist", "Content repurposing", "#8b5cf6", 28),
    ] {
        let agent = storage
            .create_agent(Agent {
                id: new_id(),
                user_id: user_id.to_string(),
                name: name.to_string(),
                role: role.to_string(),
                status: STATUS_RUNNING.to_string(),
                uptime: "99.9%".to_string(),
                color: color.to_string(),
                time_saved,
                created_at: now,
            })
            .await?;
        agents.push(agent);
    }

    let closer = &agents[1];
    storage
        .create_decision(Decision {
            id: new_id(),
            user_id: user_id.to_string(),
            agent_id: Some(closer.id.clone()),
            agent_name: closer.name.clone(),
            title: "Northwind asked for a 20% discount".to_string(),
            description: "Ada wants to sign this week if the retainer drops from $6,000 to $4,800."
                .to_string(),
            decision_type: "pricing".to_string(),
            priority: "high".to_string(),
            options: vec![
                DecisionOption {
                    label: "Accept the discount".to_string(),
                    description: "Close now at $4,800 per month.".to_string(),
                },
                DecisionOption {
                    label: "Counter at 10%".to_string(),
                    description: "Offer $5,400 with a 6-month commitment.".to_string(),
                },
                DecisionOption {
                    label: "Hold the price".to_string(),
                    description: "Keep $6,000 and add a strategy session.".to_string(),
                },
            ],
            recommendation: 1,
            status: decisions::STATUS_PENDING.to_string(),
            chosen_option: None,
            resolved_at: None,
            created_at: now,
        })
        .await?;

    for (client, amount, status, days_ago) in [
        ("Northwind", 600_000, contracts::STATUS_SIGNED, 14),
        ("Bright Labs", 250_000, contracts::STATUS_PENDING, 2),
    ] {
        storage
            .create_contract(Contract {
                id: new_id(),
                user_id: user_id.to_string(),
                client_name: client.to_string(),
                amount,
                status: status.to_string(),
                sent_at: now - Duration::days(days_ago),
            })
            .await?;
    }

    for (task, category, duration) in [
        ("Reply to client email backlog", DripCategory::Replace, 45),
        ("Competitor research", DripCategory::Delegate, 90),
        ("Quarterly strategy review", DripCategory::Invest, 120),
        ("Sales call with Northwind", DripCategory::Produce, 60),
    ] {
        storage
            .create_time_entry(TimeEntry {
                id: new_id(),
                user_id: user_id.to_string(),
                task: task.to_string(),
                category,
                duration,
                created_at: now,
            })
            .await?;
    }

    tracing::info!(user_id = %user_id, campaign_id = %campaign.id, "seeded demo data");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use sovereign_core::auth::verify_password;
    use sovereign_core::dashboard::DashboardStats;

    use super::*;
    use crate::storage::MemoryStorage;

    const USER: &str = "demo-user-id";

    #[tokio::test]
    async fn demo_user_is_created_once() {
        let storage = MemoryStorage::new();
        let first = ensure_demo_user(&storage, USER).await.expect("demo user");
        let second = ensure_demo_user(&storage, USER).await.expect("demo user");
        assert_eq!(first, second);
        assert!(first.password_hash.starts_with("$argon2"));
        assert!(!verify_password("", &first.password_hash).expect("hash parses"));
    }

    #[tokio::test]
    async fn changed_demo_id_gets_its_own_username() {
        let storage = MemoryStorage::new();
        let old = ensure_demo_user(&storage, USER).await.expect("demo user");
        let new = ensure_demo_user(&storage, "demo-2").await.expect("second demo user");
        assert_eq!(old.username, "demo");
        assert_eq!(new.username, "demo-demo-2");
        assert_eq!(
            storage.get_user_by_username("demo").await.expect("lookup").map(|u| u.id),
            Some(USER.to_string())
        );
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let storage = MemoryStorage::new();
        assert!(seed_demo_data(&storage, USER).await.expect("seed"));
        assert!(!seed_demo_data(&storage, USER).await.expect("seed"));

        let campaigns = storage.get_campaigns_by_user(USER).await.expect("campaigns");
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].waitlist_size, 2);
        assert_eq!(storage.get_leads_by_user(USER).await.expect("leads").len(), 2);
    }

    #[tokio::test]
    async fn seeded_workspace_has_one_pending_decision() {
        let storage = MemoryStorage::new();
        seed_demo_data(&storage, USER).await.expect("seed");

        let pending = storage.get_pending_decisions(USER).await.expect("pending");
        assert_eq!(pending.len(), 1);
        assert!(pending[0].option_issues().is_empty());

        let campaigns = storage.get_campaigns_by_user(USER).await.expect("campaigns");
        let agents = storage.get_agents_by_user(USER).await.expect("agents");
        let contracts = storage.get_contracts_by_user(USER).await.expect("contracts");
        let stats = DashboardStats::compute(&campaigns, &agents, &pending, &contracts);
        assert_eq!(stats.total_time_saved, 172);
        assert_eq!(stats.active_contracts, 2);
    }
}
