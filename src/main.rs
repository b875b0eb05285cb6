use clap::{Parser, Subcommand};
use tracing::info;

use concert_scout::aggregator::Aggregator;
use concert_scout::config::Config;
use concert_scout::matching::{ConcertRanker, NoopRanker, OpenAiRanker};
use concert_scout::providers;
use concert_scout::recommend::RecommendationEngine;
use concert_scout::taste::{InMemoryTokens, SpotifyTaste};
use concert_scout::types::SearchQuery;
use concert_scout::{logging, metrics, server};

use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "concert_scout")]
#[command(about = "Concert discovery and taste-matched recommendations")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the recommendation HTTP server
    Serve {
        #[arg(long, default_value_t = 3001)]
        port: u16,
    },
    /// Run one aggregation pass and print per-provider results
    Search {
        /// City to search (e.g. Copenhagen)
        location: String,
        /// First day of the window (YYYY-MM-DD)
        start_date: NaiveDate,
        /// Last day of the window (YYYY-MM-DD)
        end_date: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();
    metrics::init_metrics();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port } => {
            let aggregator = Aggregator::new(providers::build_providers(&config));
            let tokens = Arc::new(InMemoryTokens::new());
            let taste = Arc::new(SpotifyTaste::new(tokens));

            let ranker: Arc<dyn ConcertRanker> = match &config.openai_api_key {
                Some(key) => Arc::new(OpenAiRanker::new(key.clone(), config.settings.ai.clone())),
                None => {
                    info!("OPENAI_API_KEY not set, AI ranking disabled");
                    Arc::new(NoopRanker)
                }
            };

            let engine = Arc::new(RecommendationEngine::new(aggregator, taste, ranker));
            server::start_server(engine, port).await?;
        }
        Commands::Search { location, start_date, end_date } => {
            println!("🔍 Searching concerts in {} from {} to {}...", location, start_date, end_date);

            let aggregator = Aggregator::new(providers::build_providers(&config));
            let query = SearchQuery { location, start_date, end_date };
            let outcome = aggregator.search(&query).await;

            println!("\n📊 Provider results:");
            for (provider, result) in &outcome.diagnostics.providers {
                if result.success {
                    println!("   ✅ {}: {} events", provider, result.count);
                } else {
                    println!(
                        "   ❌ {}: {}",
                        provider,
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }

            println!(
                "\n🎉 {} unique events ({} before deduplication)",
                outcome.diagnostics.after_dedup, outcome.diagnostics.total_found
            );
            for event in &outcome.events {
                println!("   {}  {} @ {} [{}]", event.date, event.name, event.venue, event.source);
            }
        }
    }

    Ok(())
}
