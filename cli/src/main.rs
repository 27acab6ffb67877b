use clap::{Parser, Subcommand};

mod commands;
mod util;

use commands::agents::AgentCommands;
use commands::decisions::DecisionCommands;
use commands::time::TimeCommands;

#[derive(Parser)]
#[command(name = "sovereign", version, about = "Sovereign OS CLI: agents, decisions and DRIP time tracking from the terminal")]
struct Cli {
    /// API base URL
    #[arg(long, env = "SOVEREIGN_API_URL", default_value = "http://localhost:5000")]
    api_url: String,

    /// Skip pretty-printing (raw JSON for piping)
    #[arg(long, global = true)]
    raw: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Dashboard statistics
    Stats,
    /// Agent operations
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// 1:3:1 decisions
    Decisions {
        #[command(subcommand)]
        command: DecisionCommands,
    },
    /// DRIP time tracking
    Time {
        #[command(subcommand)]
        command: TimeCommands,
    },
    /// Classify a task as delegate, replace, invest or produce
    Drip { task: String },
    /// Send one message to the assistant
    Chat {
        message: String,
        /// Conversation to continue
        #[arg(long, default_value = "cli")]
        session: String,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let api_url = cli.api_url.as_str();

    let code = match cli.command {
        Commands::Health => commands::health::run(api_url, cli.raw).await,
        Commands::Stats => commands::health::stats(api_url, cli.raw).await,
        Commands::Agents { command } => commands::agents::run(api_url, command, cli.raw).await,
        Commands::Decisions { command } => {
            commands::decisions::run(api_url, command, cli.raw).await
        }
        Commands::Time { command } => commands::time::run(api_url, command, cli.raw).await,
        Commands::Drip { task } => commands::ai::drip(api_url, &task, cli.raw).await,
        Commands::Chat { message, session } => {
            commands::ai::chat(api_url, &message, &session, cli.raw).await
        }
    };

    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn time_log_parses_category() {
        let cli = Cli::try_parse_from([
            "sovereign", "time", "log", "Inbox zero", "--category", "replace", "--minutes", "30",
        ])
        .expect("arguments should parse");
        match cli.command {
            Commands::Time {
                command: TimeCommands::Log { category, minutes, .. },
            } => {
                assert_eq!(category, sovereign_core::drip::DripCategory::Replace);
                assert_eq!(minutes, 30);
            }
            _ => panic!("expected time log"),
        }
    }

    #[test]
    fn unknown_category_is_a_usage_error() {
        assert!(
            Cli::try_parse_from([
                "sovereign", "time", "log", "x", "--category", "nap", "--minutes", "5",
            ])
            .is_err()
        );
    }
}
