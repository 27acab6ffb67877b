use clap::Subcommand;
use serde_json::json;

use crate::util::api_request;

#[derive(Subcommand)]
pub enum DecisionCommands {
    /// List decisions
    List {
        /// Only decisions still awaiting an answer
        #[arg(long)]
        pending: bool,
    },
    /// Approve a pending decision
    Approve {
        id: String,
        /// Option to choose (0-based). Defaults to the agent's recommendation.
        #[arg(long)]
        option: Option<i32>,
    },
    /// Reject a pending decision
    Reject { id: String },
}

pub async fn run(api_url: &str, command: DecisionCommands, raw: bool) -> i32 {
    match command {
        DecisionCommands::List { pending } => {
            let path = if pending {
                "/api/decisions?status=pending"
            } else {
                "/api/decisions"
            };
            api_request(api_url, reqwest::Method::GET, path, None, raw).await
        }
        DecisionCommands::Approve { id, option } => {
            let body = option.map(|index| json!({ "optionIndex": index }));
            api_request(
                api_url,
                reqwest::Method::POST,
                &format!("/api/decisions/{id}/approve"),
                body,
                raw,
            )
            .await
        }
        DecisionCommands::Reject { id } => {
            api_request(
                api_url,
                reqwest::Method::POST,
                &format!("/api/decisions/{id}/reject"),
                None,
                raw,
            )
            .await
        }
    }
}
