use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde_json::Value;

/// Output of a text generator. Real model backends may hand back parsed JSON
/// directly; the mock only ever produces prose.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    Structured(Value),
    Text(String),
}

impl Generation {
    /// Text form for transcripts and plain chat replies.
    pub fn into_text(self) -> String {
        match self {
            Generation::Text(text) => text,
            Generation::Structured(value) => value.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generator unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait TextGenerator: Send + Sync + 'static {
    /// `agent_type` names the caller (`"chat"`, `"inbox-sentinel"`, ...) so a
    /// backend can pick a system prompt.
    async fn generate(
        &self,
        message: &str,
        agent_type: Option<&str>,
    ) -> Result<Generation, GenerationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseBucket {
    Greeting,
    Automation,
    Agent,
    Decision,
    Default,
}

impl ResponseBucket {
    /// First bucket whose keywords occur in the lowercased message.
    pub fn for_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        // "hi" alone would match "this", "which" ... so greetings match on words
        let greeting = lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| matches!(w, "hello" | "hi" | "hey"));

        if greeting {
            ResponseBucket::Greeting
        } else if has(&["automat", "workflow"]) {
            ResponseBucket::Automation
        } else if has(&["agent"]) {
            ResponseBucket::Agent
        } else if has(&["decision", "decide", "choose"]) {
            ResponseBucket::Decision
        } else {
            ResponseBucket::Default
        }
    }

    pub fn responses(self) -> &'static [&'static str] {
        match self {
            ResponseBucket::Greeting => &[
                "Hello! I'm your Sovereign OS assistant. I can help you automate workflows, manage your agents, and work through pending decisions.",
                "Hi there! Ready to reclaim some time today? Ask me about your agents, campaigns or anything on your DRIP matrix.",
            ],
            ResponseBucket::Automation => &[
                "Let's look at that workflow. Start by listing the repetitive steps, then we can decide which ones an agent should own and which need your judgment.",
                "Automation works best on tasks you repeat weekly with the same inputs. Log a few of them as time entries and I'll flag the ones worth replacing.",
                "I'd map the workflow into trigger, steps and hand-off first. Most of the win comes from removing the hand-offs.",
            ],
            ResponseBucket::Agent => &[
                "Your agents are running smoothly. Inbox Sentinel has been triaging mail and Dossier has prospect briefs ready for review.",
                "I can pause, resume or reconfigure any agent. Tell me which one and what you want it to focus on.",
            ],
            ResponseBucket::Decision => &[
                "Here's how I'd frame it: one problem, three options, one recommendation. Check your decision queue and I'll walk you through the trade-offs.",
                "When choosing, weigh reversibility first. If the option is easy to undo, take the faster path and review it next week.",
            ],
            ResponseBucket::Default => &[
                "I understand. Let me look into that for you. In the meantime, your dashboard has the latest numbers on campaigns and agents.",
                "Good question. Could you share a bit more context so I can point you at the right agent or report?",
                "Noted. I'll keep that in mind while your agents work through today's queue.",
            ],
        }
    }
}

/// Canned-response generator: picks a random reply from the bucket matched by
/// keywords in the message.
#[derive(Debug, Default, Clone)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn reply_for(message: &str) -> String {
        let bucket = ResponseBucket::for_message(message);
        let responses = bucket.responses();
        responses
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(responses[0])
            .to_string()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        message: &str,
        _agent_type: Option<&str>,
    ) -> Result<Generation, GenerationError> {
        Ok(Generation::Text(Self::reply_for(message)))
    }
}
