use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "coco")]
#[command(about = "COCO - trophies, streaks and levels for recipe sharing")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.coco/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the progression database (overrides the config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the level for a point total
    Level {
        points: u64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List all achievements
    Achievements,

    /// Set a user statistic
    Metric {
        #[arg(short, long)]
        user: String,

        /// Metric name (e.g. recipe_count, friend_count)
        #[arg(short, long)]
        metric: String,

        /// Category for per-category metrics (e.g. dessert)
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        value: u64,
    },

    /// Record daily activity for a user
    Activity {
        #[arg(short, long)]
        user: String,

        /// Calendar day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Evaluate achievements for a user
    Evaluate {
        #[arg(short, long)]
        user: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show points and level for a user
    Progress {
        #[arg(short, long)]
        user: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = coco::config::Config::load(cli.config.as_deref())?;
    let db_path = cli.db.unwrap_or_else(|| config.database_path());

    match cli.command {
        Commands::Level { points, json } => {
            cli::level::level_command(points, json)?;
        }
        Commands::Achievements => {
            cli::achievements::list_command();
        }
        Commands::Metric {
            user,
            metric,
            category,
            value,
        } => {
            cli::metric::metric_command(&db_path, &user, &metric, category.as_deref(), value)
                .await?;
        }
        Commands::Activity { user, date } => {
            cli::activity::activity_command(&db_path, &config, &user, date.as_deref()).await?;
        }
        Commands::Evaluate { user, json } => {
            cli::activity::evaluate_command(&db_path, &config, &user, json).await?;
        }
        Commands::Progress { user, json } => {
            cli::level::progress_command(&db_path, &user, json).await?;
        }
    }

    Ok(())
}
