use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tessera::cli::commands;
use tessera::config::AppConfig;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(author, version, about = "Personal health measurement aggregation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one vendor sync for a user
    Sync {
        /// User to sync for
        #[arg(short, long)]
        user: String,
        /// Vendor to pull from (withings or garmin)
        #[arg(short, long)]
        vendor: String,
        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
    },
    /// Query one metric over time
    Trend {
        /// Entity to query (snapshot column name or canonical type)
        entity: String,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
    },
    /// Aggregated multi-metric query
    TrendAgg {
        /// Entities to query, comma-separated (max 5)
        #[arg(long, value_delimiter = ',')]
        entities: Vec<String>,
        /// Bucket size: daily, weekly, or monthly
        #[arg(long, default_value = "daily")]
        bucket: String,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        /// Max raw rows fetched per entity before aggregation (max 1000)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Manage vendor integrations
    Integration {
        #[command(subcommand)]
        command: IntegrationCommands,
    },
    /// Import daily nutrition snapshots
    Snapshot {
        #[command(subcommand)]
        command: SnapshotCommands,
    },
}

#[derive(Subcommand)]
enum IntegrationCommands {
    /// Connect a vendor for a user
    Connect {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        vendor: String,
        /// OAuth refresh token (withings)
        #[arg(long)]
        refresh_token: Option<String>,
        /// Account email (garmin)
        #[arg(long)]
        email: Option<String>,
        /// Account password (garmin)
        #[arg(long)]
        password: Option<String>,
    },
    /// Disconnect an integration and delete its observations
    Disconnect {
        #[arg(short, long)]
        user: String,
        /// Integration id to remove
        id: String,
    },
    /// List a user's integrations
    List {
        #[arg(short, long)]
        user: String,
    },
}

#[derive(Subcommand)]
enum SnapshotCommands {
    /// Import a JSON array of daily snapshot rows
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!(
            "{}",
            serde_json::json!({ "error": e.to_string(), "status": e.status() })
        );
        std::process::exit(1);
    }
}

async fn run() -> tessera::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Sync {
            user,
            vendor,
            start_date,
            end_date,
        } => commands::sync_run(&config, &user, &vendor, start_date, end_date).await,
        Commands::Trend {
            entity,
            start_date,
            end_date,
        } => commands::trend_query(&config, &entity, start_date, end_date),
        Commands::TrendAgg {
            entities,
            bucket,
            start_date,
            end_date,
            limit,
        } => commands::trend_aggregated(&config, &entities, &bucket, start_date, end_date, limit),
        Commands::Integration { command } => match command {
            IntegrationCommands::Connect {
                user,
                vendor,
                refresh_token,
                email,
                password,
            } => commands::connect(&config, &user, &vendor, refresh_token, email, password),
            IntegrationCommands::Disconnect { user, id } => {
                commands::disconnect(&config, &user, &id)
            }
            IntegrationCommands::List { user } => commands::list_integrations(&config, &user),
        },
        Commands::Snapshot { command } => match command {
            SnapshotCommands::Import { file } => commands::import_snapshots(&config, &file),
        },
    }
}
