use anyhow::Context;
use chrono::Utc;
use glove_market::cli::{self, Command};
use glove_market::models::{Extras, Market};
use glove_market::snapshot::{parse_snapshot, write_snapshot};
use glove_market::{Pipeline, PipelineConfig, SourceFilter, SourceStats};
use serde::Serialize;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args(std::env::args().skip(1))?;

    let mut config = PipelineConfig::resolve(args.config.as_deref())?;
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = dir;
    }
    let pipeline = Pipeline::new(config)?;
    let out = args.out.as_deref();

    match args.command {
        Command::Help => print!("{}", cli::USAGE),
        Command::Stats => run_stats(&pipeline, out).await?,
        Command::Products(filter) => run_products(&pipeline, filter, out).await?,
        Command::Latest => {
            for market in Market::ALL {
                match pipeline.latest_snapshot(market) {
                    Some(path) => println!("{}: {}", market, path.display()),
                    None => println!("{}: (none)", market),
                }
            }
        }
        Command::Import { market, input } => run_import(&pipeline, market, &input).await?,
    }

    Ok(())
}

async fn run_stats(pipeline: &Pipeline, out: Option<&Path>) -> anyhow::Result<()> {
    let ingests = pipeline.ingest_all(SourceFilter::All);
    let stats = pipeline.statistics_for(&ingests);

    for ingest in &ingests {
        let snapshot = ingest
            .snapshot
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "no snapshot".to_string());
        println!(
            "{} ({}): {} admitted, {} skipped {:?}",
            ingest.market,
            snapshot,
            ingest.report.products.len(),
            ingest.report.skipped.len(),
            ingest.report.skip_counts()
        );
    }
    println!();
    print_source("Auction", &stats.auction);
    print_source("Cafe", &stats.cafe);
    print_source("Total", &stats.overall);

    if let Some(out) = out {
        write_json(out, &stats).await?;
    }
    Ok(())
}

fn print_source(label: &str, stats: &SourceStats) {
    println!("{}: {} items, average ₩{}", label, stats.count, stats.average_price);
    println!("   Brands: {:?}", stats.brands);
    println!("   Positions: {:?}", stats.positions);
    println!("   Conditions: {:?}", stats.conditions);
    println!("   Price ranges: {:?}", stats.price_ranges);
}

async fn run_products(
    pipeline: &Pipeline,
    filter: SourceFilter,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let products = pipeline.products(filter);

    for (i, product) in products.iter().enumerate() {
        match (&product.extras, product.source_price) {
            (Extras::Auction { .. }, Some(jpy)) => {
                println!("{}. {} (¥{} → ₩{})", i + 1, product.title, jpy, product.price)
            }
            _ => println!("{}. {} (₩{})", i + 1, product.title, product.price),
        }
        println!(
            "   {} | {} | {} | {}",
            product.brand,
            product.position.as_str(),
            product.condition.as_str(),
            product.market
        );
        println!("   URL: {}", product.url);
    }
    info!(filter = %filter, count = products.len(), "listed products");

    if let Some(out) = out {
        write_json(out, &products).await?;
    }
    Ok(())
}

async fn run_import(pipeline: &Pipeline, market: Market, input: &Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let records = parse_snapshot(&text)
        .with_context(|| format!("{} is not a JSON array or snapshot", input.display()))?
        .products;

    let config = pipeline.config();
    let now = Utc::now().with_timezone(&config.utc_offset()?);
    let path = write_snapshot(&config.data_dir, config.prefix_for(market), &records, now)?;

    info!("💾 Saved {} {} records to {}", records.len(), market, path.display());
    Ok(())
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 Saved result to {}", path.display());
    Ok(())
}
