use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use stockscope::services::{LevelCache, ScreenerService, TickerEnrichmentService};
use stockscope::sources::{CsvUniverse, StaticUniverse, YahooFinanceClient};
use stockscope::types::ScreenResult;
use stockscope::Config;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockscope=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    info!(
        "Starting stockscope: {} core symbols, penny list {}",
        config.core_tickers.len(),
        config.penny_csv.display()
    );

    // Levels are stabilized across runs through one shared cache
    let cache = LevelCache::new();
    let enrichment = Arc::new(TickerEnrichmentService::new(
        config.enrichment.clone(),
        cache,
    ));

    let yahoo = Arc::new(YahooFinanceClient::new().context("building Yahoo client")?);
    let screener = ScreenerService::new(
        config.screener(),
        enrichment,
        Arc::new(CsvUniverse::new("penny", config.penny_csv.clone())),
        Arc::new(StaticUniverse::new("core", config.core_tickers.clone())),
        yahoo.clone(),
        yahoo,
    );

    match config.repeat_secs {
        None => run_once(&screener, &config).await,
        Some(secs) => {
            info!("Repeating screen every {}s", secs);
            let mut interval = tokio::time::interval(Duration::from_secs(secs));
            loop {
                interval.tick().await;
                if let Err(e) = run_once(&screener, &config).await {
                    error!("Screen failed: {:#}", e);
                }
            }
        }
    }
}

async fn run_once(screener: &ScreenerService, config: &Config) -> anyhow::Result<()> {
    let result = screener.run().await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(ref dir) = config.output_dir {
        write_buckets(dir, &result).await?;
    }

    Ok(())
}

/// Write each bucket to `<dir>/<bucket>-<YYYY-MM-DD>.json`.
async fn write_buckets(dir: &Path, result: &ScreenResult) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;

    let date = chrono::Utc::now().format("%Y-%m-%d");
    for (bucket, records) in &result.buckets {
        let path = dir.join(format!("{}-{}.json", bucket.as_str(), date));
        let body = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {} {} records to {}", records.len(), bucket.as_str(), path.display());
    }

    Ok(())
}
