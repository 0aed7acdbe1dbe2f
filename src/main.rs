use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use matcher_lib::config::MatcherConfig;
use matcher_lib::matching::manager::run_matching_pipeline;
use matcher_lib::ror::RorClient;
use matcher_lib::utils::csv_io::{open_output, read_input};
use matcher_lib::utils::env::load_env;
use matcher_lib::utils::rate_limit::SlidingWindowLimiter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "match_ror", about = "Match eduGAIN data with ROR identifiers")]
struct Args {
    /// Input CSV file path
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV file path
    #[arg(short, long, default_value = "matched_ror_edugain.csv")]
    output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    load_env();

    let run_id = Uuid::new_v4();
    info!("Starting eduGAIN → ROR reconciliation run {}", run_id);
    info!("Processing input file: {}", args.input.display());
    info!("Output will be written to: {}", args.output.display());

    let config = MatcherConfig::from_env();
    config.log_config();

    // Fatal input errors abort before any work is dispatched
    let (schema, rows) = read_input(&args.input).context("failed to read input")?;
    let mut writer = open_output(&args.output, &schema).context("failed to open output")?;

    let limiter = Arc::new(SlidingWindowLimiter::new(
        config.rate_limit_calls,
        config.rate_limit_period,
    ));
    let client = Arc::new(RorClient::new(config.ror_api_base.clone(), limiter));

    let start = Instant::now();
    let stats =
        run_matching_pipeline(rows, Arc::new(schema), client, &config, &mut writer).await?;
    writer.flush().context("failed to flush output")?;
    let elapsed = start.elapsed();

    info!("=== Run Summary ===");
    info!("Run ID: {}", run_id);
    info!("Total rows: {}", stats.total_rows);
    info!("Rows with at least one match: {}", stats.matched_rows);
    info!("Rows unmatched: {}", stats.unmatched_rows);
    info!("Output rows written: {}", stats.output_rows);
    if stats.row_failures > 0 {
        info!("Rows recovered from worker failures: {}", stats.row_failures);
    }
    info!("Chunks processed: {}", stats.chunks_processed);
    info!("Total execution time: {:.2?}", elapsed);
    info!("Processing complete.");

    Ok(())
}
