use clap::{Parser, Subcommand};

mod commands;
mod util;

use commands::tools::Tool;

#[derive(Parser)]
#[command(
    name = "seqbridge",
    version,
    about = "Client for a seqbridge gateway: search and fetch Sequence accounts, compute sweep amounts, trigger rules"
)]
struct Cli {
    /// Gateway base URL
    #[arg(long, env = "SEQBRIDGE_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway health
    Health,
    /// Search accounts ("balances" or no query lists everything)
    Search {
        /// Free-text query
        #[arg(default_value = "")]
        query: String,
        /// Send the query as a plain-text body to the legacy /search path
        #[arg(long)]
        raw: bool,
    },
    /// Fetch an account record or a rule descriptor
    Fetch {
        /// Account id, or rule id starting with ru_
        id: String,
        /// Send the id as a plain-text body to the legacy /fetch path
        #[arg(long)]
        raw: bool,
    },
    /// Compute the sweep amount for a checking balance
    Amount {
        /// Checking balance in dollars
        #[arg(long, allow_negative_numbers = true)]
        checking_balance: f64,
    },
    /// Trigger a whitelisted rule
    Trigger {
        /// Sequence rule id (e.g. ru_123)
        rule_id: String,
        /// Gateway admin token
        #[arg(long, env = "MCP_ADMIN_TOKEN", hide_env_values = true)]
        admin_token: Option<String>,
    },
    /// Send an arbitrary request to the gateway
    Api(commands::api::ApiArgs),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Health => commands::health::run(&cli.api_url).await,
        Commands::Search { query, raw } => {
            commands::tools::run(&cli.api_url, Tool::Search, &query, raw).await
        }
        Commands::Fetch { id, raw } => {
            commands::tools::run(&cli.api_url, Tool::Fetch, &id, raw).await
        }
        Commands::Amount { checking_balance } => {
            commands::amount::run(&cli.api_url, checking_balance).await
        }
        Commands::Trigger {
            rule_id,
            admin_token,
        } => commands::trigger::run(&cli.api_url, &rule_id, admin_token.as_deref()).await,
        Commands::Api(args) => commands::api::run(&cli.api_url, args).await,
    };

    std::process::exit(code);
}
