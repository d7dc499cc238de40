use clap::{Parser, Subcommand};
use provider_rating::config::load_from_env;
use provider_rating::server::{self, Role};
use tracing_subscriber::EnvFilter;

/// Provider rating ingestion and aggregation service.
#[derive(Parser)]
#[command(name = "provider-rating")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// HTTP API with aggregation worker and notification consumer (default)
    Serve,
    /// Aggregation worker only
    Aggregate,
    /// Notification consumer only
    Notify,
}

impl From<Command> for Role {
    fn from(command: Command) -> Self {
        match command {
            Command::Serve => Role::Serve,
            Command::Aggregate => Role::Aggregate,
            Command::Notify => Role::Notify,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_from_env()?;
    init_tracing(&config.log_level, &config.log_format);
    config.print_summary();

    let role = cli.command.unwrap_or(Command::Serve).into();
    tracing::info!("Starting as {:?}", role);

    server::run(config, role).await
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    if format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
