//! Mock AI service and the prompt-template agents built on it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sovereign_core::drip::{self, DripAnalysis};
use tokio::sync::RwLock;

pub mod closer;
pub mod content_alchemist;
pub mod dossier;
pub mod generator;
pub mod inbox_sentinel;
pub mod structured;

pub use generator::{Generation, GenerationError, MockGenerator, TextGenerator};

use inbox_sentinel::{InboxSentinelAgent, ReplyOptions};

/// Oldest messages are dropped beyond this many per session.
pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content,
            timestamp: Utc::now(),
        }
    }
}

pub struct AiService {
    generator: Arc<dyn TextGenerator>,
    sessions: RwLock<HashMap<String, Vec<ChatMessage>>>,
    timezone: Tz,
}

impl AiService {
    pub fn new(generator: Arc<dyn TextGenerator>, timezone: Tz) -> Self {
        Self {
            generator,
            sessions: RwLock::new(HashMap::new()),
            timezone,
        }
    }

    pub fn mock(timezone: Tz) -> Self {
        Self::new(Arc::new(MockGenerator), timezone)
    }

    /// Timezone used for business-day arithmetic.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Generates a reply and records it in the session together with the
    /// user message. Nothing is recorded when generation fails.
    pub async fn chat(
        &self,
        session_id: &str,
        message: &str,
        agent_type: Option<&str>,
    ) -> Result<Generation, GenerationError> {
        let generation = self.generator.generate(message, agent_type).await?;

        self.record(
            session_id,
            [
                ChatMessage::new("user", message.to_string()),
                ChatMessage::new("assistant", generation.clone().into_text()),
            ],
        )
        .await;
        tracing::debug!(
            session_id = session_id,
            agent_type = agent_type.unwrap_or("chat"),
            "chat reply generated"
        );
        Ok(generation)
    }

    /// One-shot generation for agents. Nothing is recorded.
    pub async fn complete(
        &self,
        prompt: &str,
        agent_type: &str,
    ) -> Result<Generation, GenerationError> {
        let generation = self.generator.generate(prompt, Some(agent_type)).await?;
        tracing::debug!(agent_type = agent_type, "agent reply generated");
        Ok(generation)
    }

    async fn record(&self, session_id: &str, messages: [ChatMessage; 2]) {
        let mut sessions = self.sessions.write().await;
        let history = sessions.entry(session_id.to_string()).or_default();
        history.extend(messages);
        if history.len() > MAX_HISTORY {
            let excess = history.len() - MAX_HISTORY;
            history.drain(..excess);
        }
    }

    pub async fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns whether the session had any history.
    pub async fn clear_history(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    pub fn analyze_drip(&self, task_description: &str) -> DripAnalysis {
        drip::analyze_drip(task_description)
    }

    pub async fn generate_email_replies(
        &self,
        email_content: &str,
    ) -> Result<ReplyOptions, GenerationError> {
        InboxSentinelAgent::new(self).draft_replies(email_content).await
    }
}
