//! Inbox Sentinel: triages incoming mail and drafts 1:3:1 reply options.

use serde::{Deserialize, Serialize};

use super::structured::structured;
use super::{AiService, GenerationError};

const AGENT_TYPE: &str = "inbox-sentinel";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailAnalysis {
    /// "high", "medium" or "low"
    pub urgency: String,
    pub category: String,
    pub summary: String,
    pub suggested_action: String,
    pub requires_human: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyOption {
    pub label: String,
    pub content: String,
}

/// One problem, three candidate replies, one recommended reply index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyOptions {
    pub problem: String,
    pub options: Vec<ReplyOption>,
    pub recommendation: usize,
}

impl ReplyOptions {
    fn is_well_formed(&self) -> bool {
        self.options.len() == 3 && self.recommendation < self.options.len()
    }
}

pub struct InboxSentinelAgent<'a> {
    ai: &'a AiService,
}

impl<'a> InboxSentinelAgent<'a> {
    pub fn new(ai: &'a AiService) -> Self {
        Self { ai }
    }

    pub async fn triage(&self, email: &str) -> Result<EmailAnalysis, GenerationError> {
        let prompt = format!(
            "Analyze this email and respond with JSON containing urgency (high/medium/low), \
             category, summary, suggestedAction and requiresHuman.\n\nEmail:\n{email}"
        );
        let generation = self.ai.complete(&prompt, AGENT_TYPE).await?;
        Ok(structured(&generation).unwrap_or_else(|| fallback_analysis(email)))
    }

    pub async fn draft_replies(&self, email: &str) -> Result<ReplyOptions, GenerationError> {
        let prompt = format!(
            "Draft three reply options for this email using the 1:3:1 format. Respond with JSON \
             containing problem, options (label, content) and recommendation (option index).\
             \n\nEmail:\n{email}"
        );
        let generation = self.ai.complete(&prompt, AGENT_TYPE).await?;
        Ok(structured::<ReplyOptions>(&generation)
            .filter(ReplyOptions::is_well_formed)
            .unwrap_or_else(fallback_replies))
    }
}

fn fallback_analysis(email: &str) -> EmailAnalysis {
    let lower = email.to_lowercase();
    let urgent = ["urgent", "asap", "today", "deadline"]
        .iter()
        .any(|w| lower.contains(w));
    EmailAnalysis {
        urgency: if urgent { "high" } else { "medium" }.to_string(),
        category: "general".to_string(),
        summary: "Incoming message that needs a response.".to_string(),
        suggested_action: "Review and reply with one of the drafted options.".to_string(),
        requires_human: urgent,
    }
}

fn fallback_replies() -> ReplyOptions {
    ReplyOptions {
        problem: "The sender is waiting on a response and the next step is unclear.".to_string(),
        options: vec![
            ReplyOption {
                label: "Accept".to_string(),
                content: "Thanks for reaching out. That works for me, let's go ahead as proposed."
                    .to_string(),
            },
            ReplyOption {
                label: "Clarify".to_string(),
                content: "Thanks for the note. Before I commit, could you share a few more details on scope and timing?"
                    .to_string(),
            },
            ReplyOption {
                label: "Decline".to_string(),
                content: "Thank you for thinking of me. I'm not able to take this on right now, but let's revisit next quarter."
                    .to_string(),
            },
        ],
        recommendation: 1,
    }
}
