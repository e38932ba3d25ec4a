use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use graph_client::GraphClient;
use groupstat_ingest::config::check_max_attempts;
use groupstat_ingest::{Config, ImportSettings, Importer, PostStore};

/// Import every post of a Facebook group into Postgres.
#[derive(Parser, Debug)]
#[command(name = "groupstat-import")]
struct Cli {
    /// Run database migrations before importing
    #[arg(long)]
    migrate: bool,

    /// Only run migrations, do not import
    #[arg(long)]
    migrate_only: bool,

    /// Posts per feed page (overrides FEED_PAGE_SIZE)
    #[arg(long)]
    page_size: Option<u32>,

    /// Give up on a URL after this many failed attempts (default: never)
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Pause between failed attempts, in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("groupstat=info".parse()?)
                .add_directive("graph_client=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if cli.max_attempts.is_some() {
        config.max_attempts = check_max_attempts(cli.max_attempts)?;
    }
    if let Some(ms) = cli.retry_delay_ms {
        config.retry_delay = Duration::from_millis(ms);
    }

    let store = PostStore::connect(&config.database_url).await?;
    if cli.migrate || cli.migrate_only {
        store.migrate().await?;
        info!("Migrations complete");
        if cli.migrate_only {
            return Ok(());
        }
    }

    let client = GraphClient::new().with_retry(config.retry_policy());

    let importer = Importer::new(&client, &store, ImportSettings::from_config(&config));
    let summary = importer.run().await?;

    info!(
        processed = summary.processed,
        inserted = summary.inserted,
        already_present = summary.already_present,
        "Import complete"
    );
    Ok(())
}
