use clap::Subcommand;
use serde_json::json;
use sovereign_core::drip::DripCategory;

use crate::util::api_request;

#[derive(Subcommand)]
pub enum TimeCommands {
    /// Log time spent on a task
    Log {
        task: String,
        /// delegate, replace, invest or produce
        #[arg(long)]
        category: DripCategory,
        /// Duration in minutes
        #[arg(long)]
        minutes: i32,
    },
    /// List logged time entries
    List,
    /// Minutes per DRIP quadrant
    Summary,
}

pub async fn run(api_url: &str, command: TimeCommands, raw: bool) -> i32 {
    match command {
        TimeCommands::Log {
            task,
            category,
            minutes,
        } => {
            let body = json!({
                "task": task,
                "category": category.as_str(),
                "duration": minutes,
            });
            api_request(api_url, reqwest::Method::POST, "/api/time-entries", Some(body), raw).await
        }
        TimeCommands::List => {
            api_request(api_url, reqwest::Method::GET, "/api/time-entries", None, raw).await
        }
        TimeCommands::Summary => {
            api_request(
                api_url,
                reqwest::Method::GET,
                "/api/time-entries/summary",
                None,
                raw,
            )
            .await
        }
    }
}
