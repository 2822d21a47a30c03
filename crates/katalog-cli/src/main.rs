mod import;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "katalog-cli")]
#[command(about = "Katalog command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Import categories, statuses, and products
    Import {
        /// Run every check and report counts, then roll back
        #[arg(long)]
        dry_run: bool,
        /// Import a JSON payload file instead of fetching the remote feed
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// Print the feed credentials for a date (defaults to today)
    Credentials {
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    /// Fetch the remote feed and summarize it without touching the database
    Preview {
        /// Number of records to print
        #[arg(long, default_value = "3")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let command = match cli.command {
        None => {
            println!("katalog-cli: no command given, see --help");
            return Ok(());
        }
        Some(Commands::Credentials { date }) => {
            import::print_credentials(date);
            return Ok(());
        }
        Some(command) => command,
    };

    if let Commands::Preview { limit } = command {
        let feed = katalog_core::load_feed_config()?;
        init_tracing(&feed.log_level)?;
        return import::run_preview(&feed, limit).await;
    }

    let config = katalog_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    match command {
        Commands::Migrate => {
            let pool = connect(&config).await?;
            let applied = katalog_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Import { dry_run, file } => {
            let pool = connect(&config).await?;
            katalog_db::run_migrations(&pool).await?;
            import::run_import(&pool, &config, dry_run, file.as_deref()).await?;
        }
        // Need no database; answered above.
        Commands::Preview { .. } | Commands::Credentials { .. } => {}
    }

    Ok(())
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn connect(config: &katalog_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = katalog_db::PoolConfig::from_app_config(config);
    let pool = katalog_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}
