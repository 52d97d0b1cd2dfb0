use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::error;

use bhm_scraper::collectors::all_collectors;
use bhm_scraper::config::Config;
use bhm_scraper::domain::CatalogDocument;
use bhm_scraper::logging;
use bhm_scraper::pipeline::Aggregator;
use bhm_scraper::server::{self, AppState};
use bhm_scraper::storage::{FileStorage, Storage};
use bhm_scraper::tasks;

#[derive(Parser)]
#[command(name = "bhm_scraper")]
#[command(about = "Birmingham events aggregation pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scrape cycle and write the catalog snapshot
    Scrape,
    /// Serve the stored catalog over HTTP with daily scheduled scrapes
    Serve {
        /// Port override (the PORT environment variable also works)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run a scrape cycle, then serve
    Run {
        #[arg(long)]
        port: Option<u16>,
    },
}

async fn scrape_once(aggregator: &Aggregator) -> Option<CatalogDocument> {
    println!("🔄 Running scrape cycle...");
    match aggregator.run().await {
        Ok(document) => {
            let results = &document.metadata.scraping_results;
            println!("\n📊 Scrape results:");
            for (source, count) in &results.scraped {
                println!("   {}: {} events", source, count);
            }
            println!("   Normalized: {}", results.normalized);
            println!("   Duplicates removed: {}", results.deduplicated);
            println!("   Final events: {}", document.metadata.total_events);
            Some(document)
        }
        Err(e) => {
            error!("Scrape cycle failed: {}", e);
            println!("❌ Scrape failed: {}", e);
            None
        }
    }
}

async fn serve(
    aggregator: Arc<Aggregator>,
    storage: Arc<dyn Storage>,
    config: &Config,
    port_override: Option<u16>,
    initial: Option<CatalogDocument>,
) -> anyhow::Result<()> {
    let cached = match initial {
        Some(document) => Some(document),
        None => storage.load_catalog().await?,
    };
    if let Some(catalog) = &cached {
        println!(
            "📦 Loaded {} events from stored catalog",
            catalog.metadata.total_events
        );
    }

    let state = Arc::new(AppState {
        catalog: RwLock::new(cached),
        aggregator,
    });

    tokio::spawn(tasks::run_daily_schedule(
        state.clone(),
        config.scraper.scrape_hour,
    ));

    let port = port_override.unwrap_or(config.server.port);
    server::start_server(state, port).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.scraper.output_path));
    let aggregator = Arc::new(Aggregator::new(
        all_collectors(&config),
        config.clone(),
        storage.clone(),
    ));

    match cli.command {
        Commands::Scrape => {
            scrape_once(&aggregator).await;
        }
        Commands::Serve { port } => {
            serve(aggregator, storage, &config, port, None).await?;
        }
        Commands::Run { port } => {
            println!("🚀 Running full pipeline (scrape + serve)...");
            let document = scrape_once(&aggregator).await;
            serve(aggregator, storage, &config, port, document).await?;
        }
    }
    Ok(())
}
