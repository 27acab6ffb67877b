use clap::Subcommand;
use serde_json::{Value, json};
use sovereign_core::agents::{STATUS_PAUSED, STATUS_RUNNING};

use crate::util::api_request;

#[derive(Subcommand)]
pub enum AgentCommands {
    /// List your agents
    List,
    /// Create an agent
    Create {
        /// Display name (e.g. "Inbox Sentinel")
        #[arg(long)]
        name: String,
        /// What the agent does
        #[arg(long)]
        role: String,
        /// Hex color for the dashboard card
        #[arg(long)]
        color: Option<String>,
        /// Minutes saved so far
        #[arg(long)]
        time_saved: Option<i32>,
    },
    /// Pause a running agent
    Pause { id: String },
    /// Resume a paused agent
    Resume { id: String },
    /// Delete an agent (its decisions are kept)
    Delete { id: String },
}

pub fn create_body(name: &str, role: &str, color: Option<&str>, time_saved: Option<i32>) -> Value {
    let mut body = json!({ "name": name, "role": role });
    if let Some(color) = color {
        body["color"] = json!(color);
    }
    if let Some(minutes) = time_saved {
        body["timeSaved"] = json!(minutes);
    }
    body
}

pub async fn run(api_url: &str, command: AgentCommands, raw: bool) -> i32 {
    match command {
        AgentCommands::List => {
            api_request(api_url, reqwest::Method::GET, "/api/agents", None, raw).await
        }
        AgentCommands::Create {
            name,
            role,
            color,
            time_saved,
        } => {
            let body = create_body(&name, &role, color.as_deref(), time_saved);
            api_request(api_url, reqwest::Method::POST, "/api/agents", Some(body), raw).await
        }
        AgentCommands::Pause { id } => set_status(api_url, &id, STATUS_PAUSED, raw).await,
        AgentCommands::Resume { id } => set_status(api_url, &id, STATUS_RUNNING, raw).await,
        AgentCommands::Delete { id } => {
            api_request(
                api_url,
                reqwest::Method::DELETE,
                &format!("/api/agents/{id}"),
                None,
                raw,
            )
            .await
        }
    }
}

async fn set_status(api_url: &str, id: &str, status: &str, raw: bool) -> i32 {
    api_request(
        api_url,
        reqwest::Method::PATCH,
        &format!("/api/agents/{id}"),
        Some(json!({ "status": status })),
        raw,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_body_omits_unset_fields() {
        let body = create_body("Closer", "Sales", None, Some(30));
        assert_eq!(body["name"], "Closer");
        assert_eq!(body["timeSaved"], 30);
        assert!(body.get("color").is_none());
    }
}
